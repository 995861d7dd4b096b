//! 文档读写与重组模块

use crate::error::{Result, TranslationError};
use crate::types::BlockResult;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const BLOCK_SEPARATOR: &str = "\n\n";

/// 读取输入文档（UTF-8）
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| TranslationError::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// 按块序号顺序拼接所有结果，块之间用空行分隔
pub fn join_blocks(results: &[BlockResult]) -> String {
    let mut ordered: Vec<&BlockResult> = results.iter().collect();
    ordered.sort_by_key(|result| result.index);
    ordered
        .iter()
        .map(|result| result.text.as_str())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// 写入输出文档，必要时创建父目录
pub fn write_document<P: AsRef<Path>>(path: P, results: &[BlockResult]) -> Result<()> {
    let path = path.as_ref();
    let to_output_error = |source: io::Error| TranslationError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_output_error)?;
    }
    fs::write(path, join_blocks(results)).map_err(to_output_error)
}

/// Render the translation to a console-like writer, one block at a time.
pub fn render_to_console<W: Write>(results: &[BlockResult], out: &mut W) -> io::Result<()> {
    writeln!(out, "==================== Translation ====================")?;
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            writeln!(out, "---")?;
        }
        writeln!(out, "{}", result.text)?;
    }
    writeln!(out, "==================== End ====================")?;
    Ok(())
}
