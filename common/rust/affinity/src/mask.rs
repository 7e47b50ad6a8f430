use core::{
    cmp::Ordering,
    fmt::{self, Display, Formatter, Write},
};

use bitmap::{BitsIterator, location, tail_mask, words_for};

use crate::Error;

/// Mask width used when the caller does not provide one.
pub const DEFAULT_WIDTH: usize = 64;

/// Fixed-width set of affinity domains (CPU sockets, NUMA nodes).
///
/// The width is chosen at construction and never changes. Every mutator
/// validates all of its arguments before touching any bit, so a failed call
/// leaves the mask exactly as it was.
///
/// The mask is a plain value: it is `Send` and `Sync`, but shared mutation
/// must be serialized by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AffinityMask {
    width: usize,
    // Bits at positions `>= width` in the last word are always zero.
    words: Box<[u64]>,
}

impl AffinityMask {
    /// Creates a mask of the given width with the given domains set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWidth`] if `width` is zero and
    /// [`Error::OutOfRange`] if any domain is `>= width`.
    pub fn new(width: usize, domains: &[usize]) -> Result<Self, Error> {
        let mut mask = Self::empty(width)?;
        mask.add(domains)?;
        Ok(mask)
    }

    /// Creates a mask of the given width with no domains set.
    pub fn empty(width: usize) -> Result<Self, Error> {
        if width == 0 {
            return Err(Error::InvalidWidth);
        }

        Ok(Self {
            width,
            words: vec![0; words_for(width)].into_boxed_slice(),
        })
    }

    /// Creates a mask of [`DEFAULT_WIDTH`] with the given domains set.
    pub fn from_domains(domains: &[usize]) -> Result<Self, Error> {
        Self::new(DEFAULT_WIDTH, domains)
    }

    /// Returns the number of representable domains.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Includes the given domains.
    pub fn add(&mut self, domains: &[usize]) -> Result<(), Error> {
        self.check_domains(domains)?;
        for &domain in domains {
            self.insert(domain);
        }

        Ok(())
    }

    /// Excludes the given domains.
    pub fn remove(&mut self, domains: &[usize]) -> Result<(), Error> {
        self.check_domains(domains)?;
        for &domain in domains {
            let (idx, bit) = location(domain);
            self.words[idx] &= !bit;
        }

        Ok(())
    }

    /// Intersects this mask with `other` in place.
    pub fn and(&mut self, other: &Self) -> Result<(), Error> {
        self.check_width(other)?;
        for (word, other) in self.words.iter_mut().zip(other.words.iter()) {
            *word &= other;
        }

        Ok(())
    }

    /// Unites this mask with `other` in place.
    pub fn or(&mut self, other: &Self) -> Result<(), Error> {
        self.check_width(other)?;
        for (word, other) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= other;
        }

        Ok(())
    }

    /// Excludes all domains.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Includes all domains.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        if let Some(last) = self.words.last_mut() {
            *last &= tail_mask(self.width);
        }
    }

    /// Returns `true` if no domain is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Returns whether the given domain is set.
    pub fn is_set(&self, domain: usize) -> Result<bool, Error> {
        self.check_domain(domain)?;
        Ok(self.contains(domain))
    }

    /// Returns `true` if at least one of the given domains is set.
    ///
    /// An empty list yields `false`.
    pub fn any_set(&self, domains: &[usize]) -> Result<bool, Error> {
        self.check_domains(domains)?;
        Ok(domains.iter().any(|&domain| self.contains(domain)))
    }

    /// Returns `true` if both masks have the same width and the same domains
    /// set.
    ///
    /// Never fails: masks of different widths are simply not equal.
    #[inline]
    pub fn is_equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Returns `true` if this mask, read as an unsigned integer with domain
    /// `width - 1` as the most significant bit, is less than `other`.
    pub fn is_less_than(&self, other: &Self) -> Result<bool, Error> {
        Ok(self.cmp_value(other)? == Ordering::Less)
    }

    /// Returns `true` if this mask, read as an unsigned integer, is greater
    /// than `other`.
    pub fn is_greater_than(&self, other: &Self) -> Result<bool, Error> {
        Ok(self.cmp_value(other)? == Ordering::Greater)
    }

    /// Returns `true` if this mask spans fewer domains than `other`.
    ///
    /// Masks with the same number of domains are ordered by
    /// [`is_less_than`](Self::is_less_than), so lower domain indices win
    /// ties.
    pub fn is_narrower_than(&self, other: &Self) -> Result<bool, Error> {
        self.check_width(other)?;
        match self.count().cmp(&other.count()) {
            Ordering::Equal => self.is_less_than(other),
            ord => Ok(ord == Ordering::Less),
        }
    }

    /// Returns the number of domains set.
    #[inline]
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns an iterator over the set domains in ascending order.
    #[inline]
    pub fn domains(&self) -> BitsIterator<'_> {
        BitsIterator::new(&self.words)
    }

    /// Returns the set domains in ascending order.
    pub fn sockets(&self) -> Vec<usize> {
        self.domains().collect()
    }

    /// Sets a domain that is already known to be in range.
    #[inline]
    pub(crate) fn insert(&mut self, domain: usize) {
        debug_assert!(domain < self.width);
        let (idx, bit) = location(domain);
        self.words[idx] |= bit;
    }

    #[inline]
    fn contains(&self, domain: usize) -> bool {
        let (idx, bit) = location(domain);
        self.words[idx] & bit != 0
    }

    fn cmp_value(&self, other: &Self) -> Result<Ordering, Error> {
        self.check_width(other)?;
        Ok(self.words.iter().rev().cmp(other.words.iter().rev()))
    }

    #[inline]
    fn check_domain(&self, domain: usize) -> Result<(), Error> {
        if domain < self.width {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index: domain,
                width: self.width,
            })
        }
    }

    fn check_domains(&self, domains: &[usize]) -> Result<(), Error> {
        domains.iter().try_for_each(|&domain| self.check_domain(domain))
    }

    #[inline]
    fn check_width(&self, other: &Self) -> Result<(), Error> {
        if self.width == other.width {
            Ok(())
        } else {
            Err(Error::WidthMismatch {
                left: self.width,
                right: other.width,
            })
        }
    }
}

impl Default for AffinityMask {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            words: vec![0; words_for(DEFAULT_WIDTH)].into_boxed_slice(),
        }
    }
}

impl<'a> IntoIterator for &'a AffinityMask {
    type Item = usize;
    type IntoIter = BitsIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains()
    }
}

/// Writes `width` characters, `'1'` at position `i` if domain `i` is set.
impl Display for AffinityMask {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        for domain in 0..self.width {
            f.write_char(if self.contains(domain) { '1' } else { '0' })?;
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    const WIDTH: usize = 66;
    const RANDOM_SEED: u64 = 8427234087098706983;
    const ITERATIONS: usize = 1000;

    fn pattern(prefix: &str) -> String {
        format!("{prefix}{}", "0".repeat(WIDTH - prefix.len()))
    }

    /// Returns a random width and a random sorted subset of its domains.
    fn random_subset(rng: &mut StdRng) -> (usize, Vec<usize>) {
        let width = rng.gen_range(1..200);
        let domains = (0..width).filter(|_| rng.gen_bool(0.3)).collect();
        (width, domains)
    }

    #[test]
    fn new_with_domain() {
        let mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        assert_eq!(pattern("1"), mask.to_string());
    }

    #[test]
    fn new_default_width() {
        let mask = AffinityMask::from_domains(&[0]).unwrap();
        assert_eq!(DEFAULT_WIDTH, mask.width());
        assert_eq!(format!("1{}", "0".repeat(63)), mask.to_string());
        assert_eq!(AffinityMask::empty(DEFAULT_WIDTH).unwrap(), AffinityMask::default());
    }

    #[test]
    fn new_invalid() {
        assert_eq!(Err(Error::InvalidWidth), AffinityMask::new(0, &[]));
        assert_eq!(
            Err(Error::OutOfRange {
                index: 66,
                width: WIDTH
            }),
            AffinityMask::new(WIDTH, &[0, 66])
        );
    }

    #[test]
    fn add() {
        let mut mask = AffinityMask::empty(WIDTH).unwrap();
        mask.add(&[0, 1]).unwrap();
        assert_eq!(pattern("11"), mask.to_string());

        // Idempotent.
        mask.add(&[1]).unwrap();
        assert_eq!(pattern("11"), mask.to_string());
    }

    #[test]
    fn add_is_all_or_nothing() {
        let mut mask = AffinityMask::new(WIDTH, &[3]).unwrap();
        let err = mask.add(&[0, 1, 100]).unwrap_err();

        assert_eq!(
            Error::OutOfRange {
                index: 100,
                width: WIDTH
            },
            err
        );
        assert_eq!(vec![3], mask.sockets());
    }

    #[test]
    fn remove() {
        let mut mask = AffinityMask::new(WIDTH, &[0, 1]).unwrap();
        mask.remove(&[0]).unwrap();
        assert_eq!(pattern("01"), mask.to_string());

        mask.remove(&[0]).unwrap();
        assert_eq!(pattern("01"), mask.to_string());
    }

    #[test]
    fn remove_is_all_or_nothing() {
        let mut mask = AffinityMask::new(WIDTH, &[0, 1]).unwrap();
        assert!(mask.remove(&[0, WIDTH]).is_err());
        assert_eq!(vec![0, 1], mask.sockets());
    }

    #[test]
    fn and() {
        let mut mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        let other = AffinityMask::new(WIDTH, &[0]).unwrap();
        mask.and(&other).unwrap();
        assert_eq!(pattern("1"), mask.to_string());

        let other = AffinityMask::new(WIDTH, &[1, 65]).unwrap();
        mask.and(&other).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn or() {
        let mut mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        let other = AffinityMask::new(WIDTH, &[1]).unwrap();
        mask.or(&other).unwrap();
        assert_eq!(pattern("11"), mask.to_string());
    }

    #[test]
    fn width_mismatch() {
        let mut mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        let other = AffinityMask::new(64, &[0, 1]).unwrap();
        let expected = Error::WidthMismatch {
            left: WIDTH,
            right: 64,
        };

        assert_eq!(Err(expected), mask.and(&other));
        assert_eq!(Err(expected), mask.or(&other));
        assert_eq!(Err(expected), mask.is_less_than(&other));
        assert_eq!(Err(expected), mask.is_greater_than(&other));
        assert_eq!(Err(expected), mask.is_narrower_than(&other));
        assert_eq!(pattern("1"), mask.to_string());
        assert!(!mask.is_equal(&other));
    }

    #[test]
    fn clear() {
        let mut mask = AffinityMask::new(WIDTH, &[0, 1]).unwrap();
        mask.clear();
        assert_eq!("0".repeat(WIDTH), mask.to_string());
        assert!(mask.is_empty());
        assert_eq!(0, mask.count());
    }

    #[test]
    fn fill() {
        let mut mask = AffinityMask::empty(WIDTH).unwrap();
        mask.fill();
        assert_eq!("1".repeat(WIDTH), mask.to_string());
        assert_eq!(WIDTH, mask.count());

        // Tail bits stay clear, so a filled mask equals one built by hand.
        let all: Vec<_> = (0..WIDTH).collect();
        assert_eq!(AffinityMask::new(WIDTH, &all).unwrap(), mask);
    }

    #[test]
    fn fill_word_aligned() {
        let mut mask = AffinityMask::empty(128).unwrap();
        mask.fill();
        assert_eq!(128, mask.count());
    }

    #[test]
    fn is_empty() {
        let mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        assert!(!mask.is_empty());
        assert!(AffinityMask::empty(WIDTH).unwrap().is_empty());
    }

    #[test]
    fn is_set() {
        let mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        assert_eq!(Ok(true), mask.is_set(0));
        assert_eq!(Ok(false), mask.is_set(65));
        assert_eq!(
            Err(Error::OutOfRange {
                index: WIDTH,
                width: WIDTH
            }),
            mask.is_set(WIDTH)
        );
    }

    #[test]
    fn any_set() {
        let mask = AffinityMask::new(WIDTH, &[1, 64]).unwrap();
        assert_eq!(Ok(true), mask.any_set(&[0, 64]));
        assert_eq!(Ok(false), mask.any_set(&[0, 2]));
        assert_eq!(Ok(false), mask.any_set(&[]));
        assert!(mask.any_set(&[1, 200]).is_err());
    }

    #[test]
    fn is_equal() {
        let a = AffinityMask::new(WIDTH, &[0]).unwrap();
        let b = AffinityMask::new(WIDTH, &[0]).unwrap();
        assert!(a.is_equal(&b));

        let c = AffinityMask::new(WIDTH, &[1]).unwrap();
        assert!(!a.is_equal(&c));
    }

    #[test]
    fn count() {
        let mask = AffinityMask::new(WIDTH, &[0]).unwrap();
        assert_eq!(1, mask.count());
    }

    #[test]
    fn sockets() {
        let mask = AffinityMask::new(WIDTH, &[65, 0, 1]).unwrap();
        assert_eq!(vec![0, 1, 65], mask.sockets());
        assert!(AffinityMask::empty(WIDTH).unwrap().sockets().is_empty());
    }

    #[test]
    fn ordering() {
        let low = AffinityMask::new(WIDTH, &[0, 1]).unwrap();
        let high = AffinityMask::new(WIDTH, &[65]).unwrap();

        assert_eq!(Ok(true), low.is_less_than(&high));
        assert_eq!(Ok(false), low.is_greater_than(&high));
        assert_eq!(Ok(true), high.is_greater_than(&low));
        assert_eq!(Ok(false), low.is_less_than(&low));
    }

    #[test]
    fn narrower() {
        let m0 = AffinityMask::new(WIDTH, &[0]).unwrap();
        let m1 = AffinityMask::new(WIDTH, &[1]).unwrap();
        let m01 = AffinityMask::new(WIDTH, &[0, 1]).unwrap();
        let m65 = AffinityMask::new(WIDTH, &[65]).unwrap();

        assert_eq!(Ok(true), m0.is_narrower_than(&m01));
        assert_eq!(Ok(false), m01.is_narrower_than(&m0));
        assert_eq!(Ok(true), m0.is_narrower_than(&m1));
        assert_eq!(Ok(false), m1.is_narrower_than(&m0));
        assert_eq!(Ok(true), m65.is_narrower_than(&m01));
        assert_eq!(Ok(false), m0.is_narrower_than(&m0));
    }

    #[test]
    fn new_then_sockets_sorted() {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        for _ in 0..ITERATIONS {
            let (width, domains) = random_subset(&mut rng);
            let mut shuffled = domains.clone();
            shuffled.reverse();

            let mask = AffinityMask::new(width, &shuffled).unwrap();
            assert_eq!(domains, mask.sockets());
            assert_eq!(domains.len(), mask.count());
        }
    }

    #[test]
    fn add_remove_is_set() {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        for _ in 0..ITERATIONS {
            let (width, domains) = random_subset(&mut rng);
            let mut mask = AffinityMask::new(width, &domains).unwrap();
            let domain = rng.gen_range(0..width);

            mask.add(&[domain]).unwrap();
            assert_eq!(Ok(true), mask.is_set(domain));

            mask.remove(&[domain]).unwrap();
            assert_eq!(Ok(false), mask.is_set(domain));
        }
    }

    #[test]
    fn and_or_commutative_idempotent() {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        for _ in 0..ITERATIONS {
            let (width, a) = random_subset(&mut rng);
            let b: Vec<_> = (0..width).filter(|_| rng.gen_bool(0.5)).collect();
            let a = AffinityMask::new(width, &a).unwrap();
            let b = AffinityMask::new(width, &b).unwrap();

            let mut ab = a.clone();
            ab.and(&b).unwrap();
            let mut ba = b.clone();
            ba.and(&a).unwrap();
            assert_eq!(ab.to_string(), ba.to_string());

            let mut ab = a.clone();
            ab.or(&b).unwrap();
            let mut ba = b.clone();
            ba.or(&a).unwrap();
            assert_eq!(ab.to_string(), ba.to_string());

            let mut aa = a.clone();
            aa.and(&a).unwrap();
            assert_eq!(a, aa);
            aa.or(&a).unwrap();
            assert_eq!(a, aa);
        }
    }

    #[test]
    fn fill_clear_counts() {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        for _ in 0..ITERATIONS {
            let (width, domains) = random_subset(&mut rng);
            let mut mask = AffinityMask::new(width, &domains).unwrap();

            mask.fill();
            assert_eq!(width, mask.count());
            assert_eq!(width, mask.sockets().len());

            mask.clear();
            assert_eq!(0, mask.count());
            assert!(mask.is_empty());
        }
    }

    #[test]
    fn string_matches_is_set() {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

        for _ in 0..ITERATIONS {
            let (width, domains) = random_subset(&mut rng);
            let mask = AffinityMask::new(width, &domains).unwrap();
            let s = mask.to_string();

            assert_eq!(width, s.len());
            for (domain, ch) in s.chars().enumerate() {
                assert!(ch == '0' || ch == '1');
                assert_eq!(Ok(ch == '1'), mask.is_set(domain));
            }
        }
    }
}
