use crate::types::Lines;
use crate::utils::split_lines;
use crate::SourceCache;

impl SourceCache {
    /// The identifier is the source: keep what follows `javascript:`.
    pub(crate) fn load_inline_script(&mut self, key: &str, source: &str) -> Lines {
        self.replace_raw(key, source.to_string());
        self.store_split_lines(key, split_lines(source))
    }
}
