use umatracker_core::SlotNumber;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// clap value parser for save slot numbers.
pub fn parse_slot(s: &str) -> Result<SlotNumber, String> {
    let n: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a slot number"))?;
    SlotNumber::try_from(n)
}
