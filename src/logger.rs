/// Initializes the logging system from the default file `log4rs.yaml` in the
/// working directory. Prefer `init_for_app` for programmatic control.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let _ = log4rs::init_file("log4rs.yaml", log4rs::config::Deserializers::default());
    Ok(())
}

/// Initializes the logging system from a specific config file path.
pub fn init_path(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let _ = log4rs::init_file(path, log4rs::config::Deserializers::default());
    Ok(())
}

/// Initializes logging to `{base}/{app_name}_logs/{app_name}.log` with a
/// rolling size-based policy. Key material and plaintext are never logged by
/// this crate, so the application log is safe to ship.
///
/// # Errors
/// Returns an error if the directory cannot be created or the logger fails to
/// initialize.
pub fn init_for_app(
    base_dir: &std::path::Path,
    app_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use log::LevelFilter;
    use log4rs::append::rolling_file::RollingFileAppender;
    use log4rs::append::rolling_file::policy::compound::{
        CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
    };
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;
    use std::fs;
    use std::path::PathBuf;

    let mut dir = PathBuf::from(base_dir);
    dir.push(format!("{app_name}_logs"));
    fs::create_dir_all(&dir)?;
    let log_path = dir.join(format!("{app_name}.log"));
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{app_name}.{{}}.log")).display()), 7)?;
    let trigger = SizeTrigger::new(10 * 1024 * 1024);
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}")))
        .build(log_path, Box::new(policy))?;
    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}
