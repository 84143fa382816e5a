// 回應輸出的字元預算，超出部分裁切並附上截斷說明
pub const CHARACTER_LIMIT: usize = 25_000;

pub fn truncate_response(data: &str, message: &str) -> String {
    let original_len = data.chars().count();
    if original_len <= CHARACTER_LIMIT {
        return data.to_string();
    }

    let mut notice = format!(
        "\n\n--- RESPONSE TRUNCATED ---\nOriginal size: {} characters\nTruncated to: {} characters",
        group_digits(original_len),
        group_digits(CHARACTER_LIMIT)
    );
    if !message.is_empty() {
        notice.push('\n');
        notice.push_str(message);
    }

    // 裁切點讓「本文 + 說明」的總長度剛好等於預算
    let keep = CHARACTER_LIMIT.saturating_sub(notice.chars().count());
    let mut truncated: String = data.chars().take(keep).collect();
    truncated.push_str(&notice);
    truncated
}

fn group_digits(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
