//! Command line tests
//!
//! Flag conversion through to a constructed server, and the binary's exit codes.

#[cfg(test)]
mod tests {
    use crate::common::ContentDir;
    use clap::Parser;
    use std::process::Command;
    use stubhttp::config::cli::Cli;
    use stubhttp::config::{BodySource, StubConfig};
    use stubhttp::server::StubServer;
    use stubhttp::server::body::BodyKind;
    use stubhttp::utils::error::ConfigError;

    fn server_from(args: &[&str]) -> Result<StubServer, ConfigError> {
        let cli = Cli::try_parse_from(std::iter::once("stubhttp").chain(args.iter().copied()))
            .expect("arguments should parse");
        StubConfig::try_from(cli).and_then(StubServer::new)
    }

    fn stubhttp(args: &[&str]) -> std::process::Output {
        Command::new(env!("CARGO_BIN_EXE_stubhttp"))
            .args(args)
            .output()
            .expect("binary should run")
    }

    // ==================== Flags to server ====================

    #[test]
    fn test_data_flag_classifies_directory() {
        let content = ContentDir::new(&[("www/index.html", "hi")]);
        let data = format!("@{}", content.join("www").display());
        let server = server_from(&["-d", &data, ":0"]).unwrap();

        assert!(matches!(
            server.state().body.kind(),
            BodyKind::Directory(_)
        ));
    }

    #[test]
    fn test_data_flag_literal_with_at_inside() {
        let server = server_from(&["-d", "mail me at a@b.c", ":0"]).unwrap();
        assert_eq!(
            server.config().body,
            BodySource::Literal("mail me at a@b.c".to_string())
        );
    }

    #[test]
    fn test_missing_body_file_fails_startup() {
        let err = server_from(&["-d", "@/nonexistent/stubhttp.json", ":0"])
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::BodySource { .. }));
    }

    #[test]
    fn test_status_out_of_range_fails_startup() {
        let err = server_from(&["-s", "999", ":0"]).err().unwrap();
        assert!(err.to_string().contains("999"));
    }

    // ==================== Exit codes ====================

    #[test]
    fn test_version_exits_zero() {
        let output = stubhttp(&["--version"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_invalid_address_exits_one() {
        let output = stubhttp(&["localhost"]);
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("invalid addr: localhost"), "{}", stderr);
    }

    #[test]
    fn test_missing_address_exits_one() {
        let output = stubhttp(&[]);
        assert_eq!(output.status.code(), Some(1));
    }
}
