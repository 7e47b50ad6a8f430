use core::ops::ControlFlow;
use std::error::Error;

use affinity::{AffinityMask, and_all, iterate_masks, or_all};

use crate::{
    cfg::HintsConfig,
    cmd::{CombineCmd, HintsCmd, IterateCmd, Mode, ShowCmd},
    output::{self, MaskEntry, OutputFormat},
};

/// Longest domain list `iterate` accepts without `--limit`, about one
/// million masks.
pub const MAX_ITERATE_DOMAINS: usize = 20;

////////////////////////////////////////////////////////////////////////////////

pub struct MaskService {
    width: usize,
    format: OutputFormat,
}

impl MaskService {
    pub fn new(width: usize, format: OutputFormat) -> Self {
        Self { width, format }
    }

    pub fn handle_cmd(&self, mode: Mode) -> Result<(), Box<dyn Error>> {
        match mode {
            Mode::Show(cmd) => self.show(cmd),
            Mode::And(cmd) => self.combine("and", cmd, and_all),
            Mode::Or(cmd) => self.combine("or", cmd, or_all),
            Mode::Iterate(cmd) => self.iterate(cmd),
            Mode::Hints(cmd) => self.hints(cmd),
        }
    }

    fn show(&self, cmd: ShowCmd) -> Result<(), Box<dyn Error>> {
        let mask = cmd.domains.to_mask(self.width)?;
        log::debug!("built mask {mask} from '{}'", cmd.domains);

        output::print("Mask", &[MaskEntry::new("mask", &mask)], self.format)
    }

    fn combine<F>(&self, op: &str, cmd: CombineCmd, f: F) -> Result<(), Box<dyn Error>>
    where
        F: FnOnce(&[AffinityMask]) -> Result<AffinityMask, affinity::Error>,
    {
        let masks = cmd
            .masks
            .iter()
            .map(|domains| domains.to_mask(self.width))
            .collect::<Result<Vec<_>, _>>()?;
        let entries = combine_entries(op, &masks, f)?;

        output::print(op, &entries, self.format)
    }

    fn iterate(&self, cmd: IterateCmd) -> Result<(), Box<dyn Error>> {
        let domains = cmd.domains.to_vec(self.width)?;
        let entries = iterate_entries(self.width, &domains, cmd.limit)?;

        output::print("Combinations", &entries, self.format)
    }

    fn hints(&self, cmd: HintsCmd) -> Result<(), Box<dyn Error>> {
        let config = HintsConfig::from_file(&cmd.file)?;
        let width = config.width(self.width);
        let hints = config.masks(width)?;
        log::debug!("loaded {} hints from '{}' with width {width}", hints.len(), cmd.file);

        let entries = hint_entries(&hints).map_err(|err| format!("'{}': {err}", cmd.file))?;

        output::print("Hints", &entries, self.format)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Returns one row per operand followed by the `op` result row.
fn combine_entries<F>(op: &str, masks: &[AffinityMask], f: F) -> Result<Vec<MaskEntry>, Box<dyn Error>>
where
    F: FnOnce(&[AffinityMask]) -> Result<AffinityMask, affinity::Error>,
{
    let result = f(masks)?;
    log::debug!("{op} of {} masks: {result}", masks.len());

    let mut entries: Vec<_> = masks
        .iter()
        .enumerate()
        .map(|(idx, mask)| MaskEntry::new(format!("#{idx}"), mask))
        .collect();
    entries.push(MaskEntry::new(op, &result));

    Ok(entries)
}

/// Returns a row for each domain combination, at most `limit` of them.
///
/// Without a limit the list may hold at most [`MAX_ITERATE_DOMAINS`]
/// domains.
fn iterate_entries(width: usize, domains: &[usize], limit: Option<usize>) -> Result<Vec<MaskEntry>, Box<dyn Error>> {
    if limit.is_none() && domains.len() > MAX_ITERATE_DOMAINS {
        return Err(format!(
            "{} domains produce too many combinations, pass --limit or use at most {MAX_ITERATE_DOMAINS}",
            domains.len()
        )
        .into());
    }

    let mut entries = Vec::new();
    let flow = iterate_masks(width, domains, |mask| {
        if limit.is_some_and(|limit| entries.len() >= limit) {
            return ControlFlow::Break(());
        }

        let idx = entries.len();
        entries.push(MaskEntry::new(format!("#{idx}"), mask));
        ControlFlow::Continue(())
    })?;

    if flow.is_break() {
        log::debug!("iteration stopped after {} masks", entries.len());
    }

    Ok(entries)
}

/// Returns a row per hint followed by their intersection, their union and
/// the narrowest hint.
fn hint_entries(hints: &[(String, AffinityMask)]) -> Result<Vec<MaskEntry>, Box<dyn Error>> {
    let Some((first, rest)) = hints.split_first() else {
        return Err("no hints given".into());
    };

    let mut narrowest = first;
    for hint in rest {
        if hint.1.is_narrower_than(&narrowest.1)? {
            narrowest = hint;
        }
    }

    let masks: Vec<_> = hints.iter().map(|(_, mask)| mask.clone()).collect();
    let and = and_all(&masks)?;
    let or = or_all(&masks)?;
    if and.is_empty() {
        log::warn!("hints share no domain");
    }

    let mut entries: Vec<_> = hints
        .iter()
        .map(|(name, mask)| MaskEntry::new(name.as_str(), mask))
        .collect();
    entries.push(MaskEntry::new("and", &and));
    entries.push(MaskEntry::new("or", &or));
    entries.push(MaskEntry::new(format!("narrowest ({})", narrowest.0), &narrowest.1));

    Ok(entries)
}

////////////////////////////////////////////////////////////////////////////////
