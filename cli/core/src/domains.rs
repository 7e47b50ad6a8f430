//! Domain lists in the Linux cpulist format, e.g. `0,2-4`.

use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use affinity::AffinityMask;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDomainsError {
    #[error("empty item in domain list")]
    EmptyItem,
    #[error("invalid domain index '{0}'")]
    InvalidIndex(String),
    #[error("reversed domain range {start}-{end}")]
    ReversedRange { start: usize, end: usize },
}

/// Ordered list of affinity domains, kept as inclusive ranges.
///
/// Ranges are only expanded once a mask width is known, so a list such as
/// `0-18446744073709551615` costs nothing until it is checked against one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DomainList(Vec<(usize, usize)>);

impl DomainList {
    /// Builds a list from individual domains, collapsing runs of consecutive
    /// indices into ranges.
    pub fn new(domains: Vec<usize>) -> Self {
        let mut ranges = Vec::new();
        let mut it = domains.into_iter().peekable();

        while let Some(start) = it.next() {
            let mut end = start;
            while end < usize::MAX && it.next_if_eq(&(end + 1)).is_some() {
                end += 1;
            }
            ranges.push((start, end));
        }

        Self(ranges)
    }

    #[inline]
    pub fn ranges(&self) -> &[(usize, usize)] {
        match self {
            Self(v) => v,
        }
    }

    /// Expands the list into domains of a `width`-wide mask.
    ///
    /// Every range is checked against `width` before anything is expanded.
    pub fn to_vec(&self, width: usize) -> Result<Vec<usize>, affinity::Error> {
        if width == 0 {
            return Err(affinity::Error::InvalidWidth);
        }

        for &(start, end) in self.ranges() {
            if end >= width {
                return Err(affinity::Error::OutOfRange {
                    index: start.max(width),
                    width,
                });
            }
        }

        Ok(self.ranges().iter().flat_map(|&(start, end)| start..=end).collect())
    }

    /// Builds a mask of the given width with these domains set.
    pub fn to_mask(&self, width: usize) -> Result<AffinityMask, affinity::Error> {
        AffinityMask::new(width, &self.to_vec(width)?)
    }
}

impl From<&AffinityMask> for DomainList {
    fn from(mask: &AffinityMask) -> Self {
        Self::new(mask.sockets())
    }
}

impl FromStr for DomainList {
    type Err = ParseDomainsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        if s.trim().is_empty() {
            return Ok(Self(ranges));
        }

        for item in s.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(ParseDomainsError::EmptyItem);
            }

            match item.split_once('-') {
                Some((start, end)) => {
                    let start = parse_index(start)?;
                    let end = parse_index(end)?;
                    if start > end {
                        return Err(ParseDomainsError::ReversedRange { start, end });
                    }
                    ranges.push((start, end));
                }
                None => {
                    let idx = parse_index(item)?;
                    ranges.push((idx, idx));
                }
            }
        }

        Ok(Self(ranges))
    }
}

fn parse_index(s: &str) -> Result<usize, ParseDomainsError> {
    let s = s.trim();
    s.parse()
        .map_err(|_| ParseDomainsError::InvalidIndex(s.to_owned()))
}

impl Display for DomainList {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let items: Vec<_> = self
            .ranges()
            .iter()
            .map(|&(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{start}-{end}")
                }
            })
            .collect();

        write!(f, "{}", items.join(","))
    }
}
