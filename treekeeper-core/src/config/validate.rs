#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::config::*;

    fn write_toml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp config file");
        file.write_all(contents.as_bytes()).expect("write temp config file");
        file
    }

    #[test]
    fn defaults_with_no_file_or_overrides() {
        let loaded = load(None, CliOverrides::default()).expect("load defaults");
        assert_eq!(loaded.run, RunSettings::default());
        assert!(!loaded.filter.want(b"anything"));
    }

    #[test]
    fn file_layer_populates_filter_and_boards() {
        let file = write_toml(
            r#"
[filter]
want = ["base/.*"]
keep = ["OWNERS"]

[boards]
groups = { default = ["board-a", "board-b"] }

[run]
k_emerge = 32
"#,
        );
        let loaded = load(Some(file.path()), CliOverrides::default()).expect("load file layer");
        assert!(loaded.filter.want(b"base/a.h"));
        assert!(loaded.filter.keep(b"OWNERS"));
        assert_eq!(loaded.boards.resolve("default"), vec!["board-a", "board-b"]);
        assert_eq!(loaded.run.k_emerge, 32);
    }

    #[test]
    fn unregistered_board_token_resolves_to_itself() {
        let loaded = load(None, CliOverrides::default()).expect("load defaults");
        assert_eq!(loaded.boards.resolve("some-board"), vec!["some-board"]);
    }

    #[test]
    fn cli_overrides_win_over_file_layer() {
        let file = write_toml(
            r#"
[run]
annotation_key = "FromFile"
"#,
        );
        let overrides = CliOverrides {
            annotation_key: Some("FromCli".to_string()),
            ..CliOverrides::default()
        };
        let loaded = load(Some(file.path()), overrides).expect("load with overrides");
        assert_eq!(loaded.run.annotation_key, "FromCli");
    }

    #[test]
    fn exact_path_override_replaces_pattern_filter_entirely() {
        let mut override_file = NamedTempFile::new().expect("create override file");
        writeln!(override_file, "base/a.h").unwrap();
        writeln!(override_file, "base/b.h").unwrap();

        let config_file = write_toml(
            r#"
[filter]
want = ["third_party/.*"]
"#,
        );
        let overrides = CliOverrides {
            exact_path_file: Some(override_file.path().to_path_buf()),
            ..CliOverrides::default()
        };
        let loaded = load(Some(config_file.path()), overrides).expect("load with exact override");
        assert!(loaded.filter.want(b"base/a.h"));
        assert!(!loaded.filter.want(b"third_party/x.h"));
    }

    #[test]
    fn invalid_regex_surfaces_as_filter_error() {
        let file = write_toml(
            r#"
[filter]
want = ["("]
"#,
        );
        let err = load(Some(file.path()), CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Filter(_)));
    }
}
