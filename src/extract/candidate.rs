//! 候选块枚举与排序
//!
//! 对每个开括号，与其后出现的每个同类闭括号配对（从最右侧闭括号向左扫描，故同一开括号先产出最长块），
//! 刻意过量生成，避免漏掉真正的负载。

use std::cmp::{Ordering, Reverse};

/// 候选块的定界符种类；对象优先于数组
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DelimiterKind {
    Object,
    Array,
}

impl DelimiterKind {
    fn pair(self) -> (u8, u8) {
        match self {
            DelimiterKind::Object => (b'{', b'}'),
            DelimiterKind::Array => (b'[', b']'),
        }
    }
}

/// 原文中的一个候选子串：`text[start..end]`，`end > start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub kind: DelimiterKind,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// 排序优先级：对象先于数组；更长者优先；等长时位置更靠后者优先
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        (self.kind, Reverse(self.len()), Reverse(self.start)).cmp(&(
            other.kind,
            Reverse(other.len()),
            Reverse(other.start),
        ))
    }
}

/// 枚举全部候选块（对象在前、数组在后，按生成顺序），最多 `limit` 个
///
/// 定界符均为 ASCII，按字节下标切片不会落在 UTF-8 字符中间。
pub fn enumerate(text: &str, limit: usize) -> Vec<Candidate> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();

    for kind in [DelimiterKind::Object, DelimiterKind::Array] {
        let (open, close) = kind.pair();
        let opens: Vec<usize> = positions(bytes, open);
        let closes: Vec<usize> = positions(bytes, close);

        for &start in &opens {
            for &end in closes.iter().rev() {
                if end <= start {
                    break;
                }
                if out.len() >= limit {
                    tracing::debug!("Candidate limit {} reached, truncating enumeration", limit);
                    return out;
                }
                out.push(Candidate {
                    start,
                    end: end + 1,
                    kind,
                });
            }
        }
    }

    out
}

/// 按优先级排序（稳定排序）
pub fn prioritize(candidates: &mut [Candidate]) {
    candidates.sort_by(Candidate::priority_cmp);
}

fn positions(bytes: &[u8], needle: u8) -> Vec<usize> {
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == needle)
        .map(|(i, _)| i)
        .collect()
}
