use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;
use serde::Serialize;
use std::fs;

/// Serialize a report as YAML into `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written
pub fn save<T: Serialize>(report: &T, path: &Utf8Path) -> Result<()> {
    let text = serde_yaml::to_string(report).into_app_err_with(|| format!("serializing report for {path}"))?;

    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
    }

    fs::write(path, text).into_app_err_with(|| format!("writing report to {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::collections::BTreeMap;

    #[test]
    fn test_save_creates_directories() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let path = root.join("reports").join("out.yaml");

        let mut report = BTreeMap::new();
        let _ = report.insert("fields", 3);
        save(&report, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fields: 3\n");
    }
}
