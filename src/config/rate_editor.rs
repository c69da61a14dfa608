// ==========================================
// 产线运行速率对账 - 速率表编辑
// ==========================================
// 职责: 运行开始前定稿速率表（粘贴文件 / 命令行覆写）
// 红线: 定稿后速率表在整次运行中只读
// 红线: 坏行跳过并记录，不使整批失败
// ==========================================

use crate::domain::rate::{BulkUpsertOutcome, RateTable};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RateEditError {
    #[error("速率粘贴文件读取失败: {path}: {source}")]
    PasteFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ==========================================
// RateEditor Trait
// ==========================================
pub trait RateEditor {
    /// 在初始速率表上应用编辑，返回定稿速率表
    fn finalize(&self, table: RateTable) -> Result<RateTable, RateEditError>;
}

fn log_outcome(source: &str, outcome: &BulkUpsertOutcome) {
    info!(
        source,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "速率编辑已应用"
    );
}

// ==========================================
// PasteFileRateEditor - 批量粘贴文件
// ==========================================
// 文件格式同 bulk_upsert: 每行 "编号 ... 速率"
pub struct PasteFileRateEditor {
    path: PathBuf,
}

impl PasteFileRateEditor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RateEditor for PasteFileRateEditor {
    fn finalize(&self, mut table: RateTable) -> Result<RateTable, RateEditError> {
        let text = fs::read_to_string(&self.path).map_err(|source| RateEditError::PasteFileRead {
            path: self.path.display().to_string(),
            source,
        })?;
        let outcome = table.bulk_upsert(&text);
        log_outcome("paste_file", &outcome);
        Ok(table)
    }
}

// ==========================================
// CliRateEditor - 命令行覆写 (--rate ID=VALUE)
// ==========================================
pub struct CliRateEditor {
    pairs: Vec<String>,
}

impl CliRateEditor {
    pub fn new(pairs: Vec<String>) -> Self {
        Self { pairs }
    }

    /// ID=VALUE → "ID VALUE"，复用批量粘贴的解析规则
    fn as_paste_text(&self) -> String {
        self.pairs
            .iter()
            .map(|pair| match pair.split_once('=') {
                Some((id, value)) => format!("{} {}", id.trim(), value.trim()),
                None => pair.trim().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RateEditor for CliRateEditor {
    fn finalize(&self, mut table: RateTable) -> Result<RateTable, RateEditError> {
        if self.pairs.is_empty() {
            return Ok(table);
        }
        let outcome = table.bulk_upsert(&self.as_paste_text());
        log_outcome("cli", &outcome);
        Ok(table)
    }
}

// ==========================================
// RateEditorChain - 按顺序应用多个编辑器
// ==========================================
#[derive(Default)]
pub struct RateEditorChain {
    editors: Vec<Box<dyn RateEditor>>,
}

impl RateEditorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, editor: impl RateEditor + 'static) -> Self {
        self.editors.push(Box::new(editor));
        self
    }
}

impl RateEditor for RateEditorChain {
    fn finalize(&self, table: RateTable) -> Result<RateTable, RateEditError> {
        self.editors
            .iter()
            .try_fold(table, |table, editor| editor.finalize(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_editor_applies_pairs_and_skips_bad() {
        let editor = CliRateEditor::new(vec![
            "801=1,500.5".to_string(),
            "NEW=12".to_string(),
            "802=abc".to_string(),
        ]);

        let table = editor.finalize(RateTable::with_defaults()).unwrap();
        assert_eq!(table.get_rate("801"), Some(1500.5));
        assert_eq!(table.get_rate("NEW"), Some(12.0));
        assert_eq!(table.get_rate("802"), Some(10.0));
    }

    #[test]
    fn test_paste_file_editor() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "801 Cell One 2,000.00").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "KOP 5").unwrap();

        let table = PasteFileRateEditor::new(file.path())
            .finalize(RateTable::new())
            .unwrap();
        assert_eq!(table.get_rate("801"), Some(2000.0));
        assert_eq!(table.get_rate("KOP"), Some(5.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_paste_file_missing_is_error() {
        let result = PasteFileRateEditor::new("/nonexistent/rates.txt").finalize(RateTable::new());
        assert!(matches!(result, Err(RateEditError::PasteFileRead { .. })));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "801 100").unwrap();

        let chain = RateEditorChain::new()
            .with(PasteFileRateEditor::new(file.path()))
            .with(CliRateEditor::new(vec!["801=200".to_string()]));

        let table = chain.finalize(RateTable::new()).unwrap();
        assert_eq!(table.get_rate("801"), Some(200.0));
    }
}
