/// Test helpers: stand-in shell scripts for plocate and pkexec

use crate::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an executable `/bin/sh` script into `dir`
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }

    path
}

/// Config pointing at a fake plocate that dispatches on the database name
///
/// `system` and `media` are script fragments run for the matching
/// `--database=` argument.
pub fn fake_plocate(system: &str, media: &str) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let body = format!(
        r#"db=""
for arg in "$@"; do
  case "$arg" in
    --database=*) db="${{arg#--database=}}" ;;
  esac
done
case "$db" in
  */system.db)
{}
    ;;
  */media.db)
{}
    ;;
esac"#,
        system, media
    );
    let search_tool = write_script(dir.path(), "plocate", &body);

    let config = Config {
        search_tool,
        system_db: dir.path().join("system.db"),
        media_db: dir.path().join("media.db"),
        ..Config::default()
    };

    (dir, config)
}
