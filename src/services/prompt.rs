//! 题目生成提示词

use crate::models::Difficulty;

/// 提示词中附带的示例题目
const PROMPT_EXAMPLE: &str = r#"
<example>
{
    "question": "What is the primary goal of DevOps?",
    "options": [
        "A. To improve collaboration between development and operations teams",
        "B. To automate software deployment processes",
        "C. To reduce software development costs",
        "D. To increase software development speed"
    ],
    "answer": "A. To improve collaboration between development and operations teams"
}
</example>
"#;

/// 构建题目生成提示词
///
/// # 参数
/// - `topic`: 测验主题
/// - `difficulty`: 用户填写的难度（别名转为标准名称，其余原样写入）
/// - `question_count`: 需要生成的题目数量
pub fn build_generation_prompt(topic: &str, difficulty: &str, question_count: usize) -> String {
    format!(
        "Please generate {} questions on {}. Difficulty level is {}. \
         Please include four options and the correct answer. \
         Ensure that the options are unique. \
         Output response is json format: an array of objects with the keys \"question\", \"options\" and \"answer\", \
         where \"answer\" repeats the correct option exactly.{}",
        question_count,
        topic.trim(),
        Difficulty::prompt_label(difficulty),
        PROMPT_EXAMPLE
    )
}
