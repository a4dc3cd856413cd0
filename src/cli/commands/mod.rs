pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("tessera")
        .about("User accounts and session tokens over flat-file JSON storage")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("TESSERA_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .help("Base directory holding one subdirectory per record collection")
                .env("TESSERA_DATA_DIR")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("hashing-secret")
                .short('s')
                .long("hashing-secret")
                .help("Process-wide key for password digests")
                .env("TESSERA_HASHING_SECRET")
                .hide_env_values(true)
                .required(true),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "tessera");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("User accounts and session tokens over flat-file JSON storage".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_data_dir() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "tessera",
            "--port",
            "8080",
            "--data-dir",
            "/var/lib/tessera",
            "--hashing-secret",
            "hush",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<PathBuf>("data-dir").cloned(),
            Some(PathBuf::from("/var/lib/tessera"))
        );
        assert_eq!(
            matches.get_one::<String>("hashing-secret").cloned(),
            Some("hush".to_string())
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("TESSERA_PORT", Some("443")),
                ("TESSERA_DATA_DIR", Some("/srv/tessera-data")),
                ("TESSERA_HASHING_SECRET", Some("hush")),
                ("TESSERA_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["tessera"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<PathBuf>("data-dir").cloned(),
                    Some(PathBuf::from("/srv/tessera-data"))
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("TESSERA_LOG_LEVEL", Some(level)),
                    ("TESSERA_DATA_DIR", Some("/srv/tessera-data")),
                    ("TESSERA_HASHING_SECRET", Some("hush")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["tessera"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("TESSERA_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "tessera".to_string(),
                    "--data-dir".to_string(),
                    "/srv/tessera-data".to_string(),
                    "--hashing-secret".to_string(),
                    "hush".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();
                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_missing_data_dir_fails() {
        temp_env::with_vars(
            [
                ("TESSERA_DATA_DIR", None::<&str>),
                ("TESSERA_HASHING_SECRET", Some("hush")),
            ],
            || {
                let command = new();
                let result = command.try_get_matches_from(vec!["tessera"]);
                assert_eq!(
                    result.map_err(|e| e.kind()),
                    Err(clap::error::ErrorKind::MissingRequiredArgument)
                );
            },
        );
    }
}
