//! 判分与结果计算

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AppResult, QuizError};

/// 满分之外的及格线（百分比）
pub const PASS_PERCENT: f64 = 80.0;

/// 选项标签，如 "A. xxx"、"b) xxx"
static OPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z])\s*[.):、]").expect("选项标签正则无效"));

/// 成绩等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// 满分
    Perfect,
    /// 及格
    Pass,
    /// 不及格
    Fail,
}

/// 测验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub question_count: usize,
    /// 保留两位小数的得分百分比
    pub percent: f64,
    pub grade: Grade,
    pub message: String,
}

/// 计算测验结果
pub fn compute_result(score: usize, question_count: usize) -> AppResult<QuizResult> {
    if question_count == 0 {
        return Err(QuizError::DivisionUndefined);
    }

    let raw_percent = (score * 100) as f64 / question_count as f64;
    let percent = (raw_percent * 100.0).round() / 100.0;
    let shown = format_percent(percent);

    let (grade, message) = if score >= question_count {
        (
            Grade::Perfect,
            format!("Congrats🙂! You passed: {}%. ⭐️⭐️⭐️⭐️⭐️", shown),
        )
    } else if raw_percent >= PASS_PERCENT {
        (Grade::Pass, format!("Congrats🙂! You passed: {}%.", shown))
    } else {
        (Grade::Fail, format!("Sorry🙁! You failed: {}%.", shown))
    };

    Ok(QuizResult {
        score,
        question_count,
        percent,
        grade,
        message,
    })
}

/// 百分比显示：最多两位小数，整数保留一位（100.0、66.67、12.5）
fn format_percent(percent: f64) -> String {
    let fixed = format!("{:.2}", percent);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// 判断提交的选项是否与正确答案一致
///
/// 完全相同（忽略首尾空白）即为正确；提交单个字母时，与答案的选项标签比较。
pub fn answers_match(selected: &str, answer: &str) -> bool {
    let selected = selected.trim();
    if selected.is_empty() {
        return false;
    }
    if selected == answer.trim() {
        return true;
    }

    let mut chars = selected.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => option_label(answer)
            .map(|label| label.eq_ignore_ascii_case(&letter))
            .unwrap_or(false),
        _ => false,
    }
}

/// 提取选项标签字母
fn option_label(option: &str) -> Option<char> {
    OPTION_LABEL
        .captures(option)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
}
