//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Window and period settings. Negative values read as zero so that
    /// validation rejects them rather than wrapping.
    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        let value = self.get_int(section, key, default as i64);
        usize::try_from(value).unwrap_or(0)
    }

    /// Comma-separated list, trimmed, empty entries removed.
    fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_string(section, key)
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
