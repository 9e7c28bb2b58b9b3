//! 文件列表扫描模块
//!
//! 读取运行输入的文件列表：每行一个数据文件路径或目录。

use super::cli::AppConfig;
use super::constants::fields::DATA_EXTENSION;
use super::utils;
use crate::error::{AnalysisError, AnalysisResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 加载文件列表
///
/// 规则：
/// - 空行与 `#` 开头的行被忽略
/// - 相对路径相对于列表文件所在目录解析
/// - 目录递归展开为其下排序后的 `.jsonl` 文件
///
/// # 错误
///
/// * `IoError` - 列表文件不可读或列出的文件不存在
/// * `InvalidInput` - 列表展开后为空
pub fn load_file_list(list_path: &Path) -> AnalysisResult<Vec<PathBuf>> {
    let content = std::fs::read_to_string(list_path).map_err(|e| {
        AnalysisError::IoError(std::io::Error::new(
            e.kind(),
            format!("无法读取文件列表 {}: {e}", list_path.display()),
        ))
    })?;

    let base_dir = utils::get_parent_dir(list_path);
    let mut files = Vec::new();

    for line in content.lines() {
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }

        let path = resolve_entry(base_dir, entry);
        if path.is_dir() {
            files.extend(scan_data_files(&path));
        } else if path.is_file() {
            files.push(path);
        } else {
            return Err(AnalysisError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("数据文件不存在: {}", path.display()),
            )));
        }
    }

    if files.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "文件列表为空 / no data files in {}",
            list_path.display()
        )));
    }

    Ok(files)
}

fn resolve_entry(base_dir: &Path, entry: &str) -> PathBuf {
    let path = Path::new(entry);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// 递归扫描目录中的数据文件（按路径排序）
pub fn scan_data_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(DATA_EXTENSION))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// 显示文件扫描结果
pub fn show_scan_results(config: &AppConfig, files: &[PathBuf]) {
    println!("📁 文件列表 / file list: {}", config.input_path.display());
    println!("📄 数据文件 / data files: {}", files.len());

    if config.verbose {
        for (i, file) in files.iter().enumerate() {
            println!("   {}. {}", i + 1, utils::extract_filename_lossy(file));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tof_mass_scanner_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_comments_blank_lines_and_relative_paths() {
        let dir = scratch_dir("relative");
        fs::write(dir.join("a.jsonl"), "").unwrap();
        fs::write(dir.join("b.jsonl"), "").unwrap();
        let list = dir.join("files.txt");
        fs::write(&list, "# run 42\n\na.jsonl\n   \nb.jsonl\n").unwrap();

        let files = load_file_list(&list).unwrap();
        assert_eq!(files, vec![dir.join("a.jsonl"), dir.join("b.jsonl")]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_directory_entry_expands_sorted() {
        let dir = scratch_dir("expand");
        let data = dir.join("data");
        fs::create_dir_all(data.join("nested")).unwrap();
        fs::write(data.join("z.jsonl"), "").unwrap();
        fs::write(data.join("a.jsonl"), "").unwrap();
        fs::write(data.join("nested").join("m.jsonl"), "").unwrap();
        fs::write(data.join("notes.txt"), "").unwrap();
        let list = dir.join("files.txt");
        fs::write(&list, "data\n").unwrap();

        let files = load_file_list(&list).unwrap();
        assert_eq!(
            files,
            vec![
                data.join("a.jsonl"),
                data.join("nested").join("m.jsonl"),
                data.join("z.jsonl"),
            ]
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_entry_is_io_error() {
        let dir = scratch_dir("missing");
        let list = dir.join("files.txt");
        fs::write(&list, "absent.jsonl\n").unwrap();

        assert!(matches!(
            load_file_list(&list),
            Err(AnalysisError::IoError(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_list_is_invalid_input() {
        let dir = scratch_dir("empty");
        let list = dir.join("files.txt");
        fs::write(&list, "# nothing here\n\n").unwrap();

        assert!(matches!(
            load_file_list(&list),
            Err(AnalysisError::InvalidInput(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
