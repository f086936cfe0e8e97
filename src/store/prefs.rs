use anyhow::Result;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Closure applied by [`PreferenceStore::update`] to the current value of a key.
pub type UpdateFn<'a> = dyn FnMut(Option<String>) -> Result<String> + 'a;

/// String key-value persistence backend.
///
/// Every operation is atomic per key. `update` is the only safe way to do a
/// read-modify-write from more than one context.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Reads `key`, hands the value to `f` and stores what it returns, with no
    /// other writer able to interleave. Returns the stored value.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String>;
}

/// Process-local backend, used for tests and `backend = "memory"`.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<FxHashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String> {
        let mut values = self.values.lock();
        let next = f(values.get(key).cloned())?;
        values.insert(key.to_string(), next.clone());
        Ok(next)
    }
}
