use chrono::{DateTime, Local};
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Upper bound on random-suffix draws before giving up and keeping the last
/// candidate.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// Exclusive upper bound of the 4-digit random disambiguator.
const SUFFIX_SPACE: u16 = 10_000;

/// Source of wall-clock time for generated names. Tests pin it.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl FixedClock {
    /// 2025-01-01 12:00:00.000 local time → "20250101-120000-000".
    pub fn new_year_noon() -> Self {
        use chrono::TimeZone;
        FixedClock(Local.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// `YYYYMMDD-HHmmss-SSS`
pub fn format_timestamp(t: &DateTime<Local>) -> String {
    t.format("%Y%m%d-%H%M%S-%3f").to_string()
}

/// Extension including the leading dot, case preserved. Empty when the file
/// has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Matches canonical stems for `product_id`:
/// `{productId}_YYYYMMDD-HHmmss-SSS_NNN[_RRRR]`.
pub fn canonical_pattern(product_id: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^{}_\d{{8}}-\d{{6}}-\d{{3}}_\d{{3}}(_\d{{4}})?$",
        regex::escape(product_id)
    ))
}

/// True when the file name (extension ignored) is already canonical.
pub fn is_canonical(file_name: &str, pattern: &Regex) -> bool {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    pattern.is_match(&stem)
}

/// Return `{stem}{ext}` if free, otherwise `{stem}_{RRRR}{ext}` with a fresh
/// random suffix per draw. After `MAX_SUFFIX_ATTEMPTS` draws the last
/// candidate is returned even if still taken.
pub fn resolve_unique<R, F>(stem: &str, ext: &str, rng: &mut R, mut is_taken: F) -> String
where
    R: Rng,
    F: FnMut(&str) -> bool,
{
    let mut candidate = format!("{}{}", stem, ext);
    let mut attempts = 0;
    while is_taken(&candidate) {
        if attempts == MAX_SUFFIX_ATTEMPTS {
            tracing::warn!(
                "resolve_unique: {} suffix attempts exhausted, keeping {}",
                MAX_SUFFIX_ATTEMPTS,
                candidate
            );
            break;
        }
        let suffix = rng.gen_range(0..SUFFIX_SPACE);
        candidate = format!("{}_{:04}{}", stem, suffix, ext);
        attempts += 1;
    }
    candidate
}

/// Keep `file_name` unless it already exists in `dir`; otherwise prefix an
/// incrementing counter: `1_name.ext`, `2_name.ext`, ...
///
/// Only the disk is consulted, so two sources with the same name in one
/// batch are told apart only once the first has been written.
pub fn dedupe_with_counter(dir: &Path, file_name: &str) -> String {
    if !dir.join(file_name).exists() {
        return file_name.to_string();
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = format!("{}_{}", counter, file_name);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Generates canonical names for one call, tracking names handed out so far.
pub struct ProductNamer<'a, C: Clock> {
    product_id: &'a str,
    clock: &'a C,
    shared_timestamp: Option<String>,
    used: HashSet<String>,
}

impl<'a, C: Clock> ProductNamer<'a, C> {
    /// With `share_timestamp`, the clock is read once here and every name
    /// reuses that reading; otherwise each name reads the clock.
    pub fn new(product_id: &'a str, clock: &'a C, share_timestamp: bool) -> Self {
        let shared_timestamp = share_timestamp.then(|| format_timestamp(&clock.now()));
        Self {
            product_id,
            clock,
            shared_timestamp,
            used: HashSet::new(),
        }
    }

    fn timestamp(&self) -> String {
        match &self.shared_timestamp {
            Some(ts) => ts.clone(),
            None => format_timestamp(&self.clock.now()),
        }
    }

    /// Name for the `index`-th file (1-based) landing in `dir`.
    pub fn next_name<R: Rng>(&mut self, dir: &Path, index: usize, ext: &str, rng: &mut R) -> String {
        let stem = format!("{}_{}_{:03}", self.product_id, self.timestamp(), index);
        let used = &self.used;
        let name = resolve_unique(&stem, ext, rng, |c| used.contains(c) || dir.join(c).exists());
        self.used.insert(name.clone());
        name
    }
}
