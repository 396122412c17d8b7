//! Filesystem helpers for the embedded `PostgreSQL` test cluster.

use super::BoxError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;

fn open_dir(path: &Utf8Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| Box::new(err) as BoxError)
}

/// Reads `name` inside `dir`, treating a missing file as `None`.
fn read_optional(dir: &Utf8Path, name: &str) -> Result<Option<String>, BoxError> {
    match open_dir(dir)?.read_to_string(name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Box::new(err) as BoxError),
    }
}

/// Replaces the configured password with the one the bootstrap wrote to
/// disk, when present.
pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_file = settings.password_file.to_string_lossy().into_owned();
    let password_path = Utf8Path::new(&password_file);
    let Some(file_name) = password_path.file_name() else {
        return Err(Box::new(std::io::Error::other("password path has no file name")));
    };
    let parent = password_path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    if let Some(contents) = read_optional(parent, file_name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Picks up the port the postmaster actually bound from `postmaster.pid`.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = settings.data_dir.to_string_lossy().into_owned();
    let Some(contents) = read_optional(Utf8Path::new(&data_dir), "postmaster.pid")? else {
        return Ok(());
    };
    let port = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok());
    if let Some(bound) = port {
        settings.port = bound;
    }
    Ok(())
}
