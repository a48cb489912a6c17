/// 难度枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
}

impl Difficulty {
    /// 首页展示的全部难度
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// 获取标准名称（写入提示词）
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 尝试从字符串解析难度（精确匹配）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "beginner" | "简单" | "易" => Some(Difficulty::Easy),
            "medium" | "intermediate" | "normal" | "中等" | "中" => Some(Difficulty::Medium),
            "hard" | "advanced" | "difficult" | "困难" | "难" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// 生成提示词中使用的难度描述
    ///
    /// 精确识别的难度（含别名）使用标准名称，其余输入原样保留；空值按中等处理。
    pub fn prompt_label(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Difficulty::Medium.name().to_string();
        }
        match Self::from_str(trimmed) {
            Some(difficulty) => difficulty.name().to_string(),
            None => trimmed.to_string(),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
