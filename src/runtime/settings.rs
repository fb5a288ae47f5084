use crate::config::Settings;

/// Load the config, falling back to defaults on any failure.
///
/// The second value describes why defaults were used. It is echoed to stderr
/// right away and logged once the log file is open.
pub fn load_settings() -> (Settings, Option<String>) {
    let outcome = Settings::load()
        .map_err(|e| format!("failed to load config, using defaults: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config, using defaults: {msg}")),
        });
    match outcome {
        Ok(settings) => (settings, None),
        Err(notice) => {
            eprintln!("vinyl: {notice}");
            (Settings::default(), Some(notice))
        }
    }
}
