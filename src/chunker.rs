//! 文本分块模块
//!
//! 把任意长度的文档切分为有序的块，每块不超过给定的字符数。
//! 优先在段落边界切分；过长的段落在行尾或句末切分，其次在空格处切分，
//! 最后才按窗口边界硬切。长度按字符计算，不按字节。

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const PARAGRAPH_SEPARATOR_LEN: usize = 2;

/// 将文本切分为不超过 `max_size` 个字符的块
///
/// 块保持原文顺序。没有非空白内容的输入返回空列表。`max_size` 为0时按1处理。
///
/// # 示例
///
/// ```rust
/// use md_translate::split_into_blocks;
///
/// let blocks = split_into_blocks("# Title\n\nFirst paragraph.\n\n\n\nSecond.", 4900);
/// assert_eq!(blocks, vec!["# Title\n\nFirst paragraph.\n\nSecond.".to_string()]);
/// ```
pub fn split_into_blocks(text: &str, max_size: usize) -> Vec<String> {
    let max_size = max_size.max(1);
    let normalized = text.replace("\r\n", "\n");

    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in normalized.split(PARAGRAPH_SEPARATOR) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let paragraph_len = paragraph.chars().count();

        if paragraph_len > max_size {
            // 先输出正在拼装的块，保证顺序不被打乱
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            blocks.extend(split_long_paragraph(paragraph, max_size));
        } else if current.is_empty() {
            current.push_str(paragraph);
            current_len = paragraph_len;
        } else if current_len + PARAGRAPH_SEPARATOR_LEN + paragraph_len <= max_size {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
            current_len += PARAGRAPH_SEPARATOR_LEN + paragraph_len;
        } else {
            blocks.push(std::mem::replace(&mut current, paragraph.to_string()));
            current_len = paragraph_len;
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    enforce_max_size(blocks, max_size)
}

/// 切分单个超长段落
fn split_long_paragraph(paragraph: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        // 窗口从非空白字符开始，否则开头的空格会挤掉唯一的词边界
        while start < chars.len() && chars[start].is_whitespace() {
            start += 1;
        }
        if start == chars.len() {
            break;
        }
        let end = (start + max_size).min(chars.len());
        let (piece_end, next_start) = if end < chars.len() {
            match find_cut(&chars[start..end]) {
                Some((piece_len, advance)) => (start + piece_len, start + advance),
                None => (end, end),
            }
        } else {
            (end, end)
        };

        push_trimmed(&mut pieces, &chars[start..piece_end]);
        start = next_start;
    }

    pieces
}

/// Returns `(piece_len, advance)` relative to the window start.
///
/// A line end or sentence terminator is kept at the end of the piece. A space is
/// dropped: the piece stops before it and the scan resumes after it.
fn find_cut(window: &[char]) -> Option<(usize, usize)> {
    if let Some(i) = window
        .iter()
        .rposition(|&c| matches!(c, '\n' | '.' | '?' | '!'))
    {
        return Some((i + 1, i + 1));
    }

    match window.iter().rposition(|&c| c == ' ') {
        Some(i) if i > 0 => Some((i, i + 1)),
        _ => None,
    }
}

fn push_trimmed(pieces: &mut Vec<String>, chars: &[char]) {
    let piece: String = chars.iter().collect();
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}

/// 最后一道保险：仍然超长的块按固定窗口硬切
fn enforce_max_size(blocks: Vec<String>, max_size: usize) -> Vec<String> {
    let mut result = Vec::with_capacity(blocks.len());

    for block in blocks {
        if block.chars().count() > max_size {
            let chars: Vec<char> = block.chars().collect();
            for window in chars.chunks(max_size) {
                push_trimmed(&mut result, window);
            }
        } else if !block.is_empty() {
            result.push(block);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_empty_and_blank_input_produce_no_blocks() {
        assert!(split_into_blocks("", 100).is_empty());
        assert!(split_into_blocks("  \n\n \t \n\n\n", 100).is_empty());
    }

    #[test]
    fn test_small_paragraphs_are_packed_together() {
        let a = "a".repeat(100);
        let b = "b".repeat(200);
        let text = format!("{}\n\n{}", a, b);

        let blocks = split_into_blocks(&text, 4900);
        assert_eq!(blocks, vec![format!("{}\n\n{}", a, b)]);
    }

    #[test]
    fn test_paragraph_that_does_not_fit_starts_new_block() {
        let a = "a".repeat(60);
        let b = "b".repeat(39);
        let c = "c".repeat(10);
        // 60 + 2 + 39 = 101 > 100
        let blocks = split_into_blocks(&format!("{}\n\n{}\n\n{}", a, b, c), 100);
        assert_eq!(blocks, vec![a, format!("{}\n\n{}", b, c)]);
    }

    #[test]
    fn test_exact_fit_is_merged() {
        let a = "a".repeat(49);
        let b = "b".repeat(49);
        let blocks = split_into_blocks(&format!("{}\n\n{}", a, b), 100);
        assert_eq!(blocks.len(), 1);
        assert_eq!(char_len(&blocks[0]), 100);
    }

    #[test]
    fn test_long_paragraph_flushes_current_block_first() {
        let short = "short intro";
        let long = "word ".repeat(50);
        let tail = "tail";
        let blocks = split_into_blocks(&format!("{}\n\n{}\n\n{}", short, long, tail), 60);

        assert_eq!(blocks.first().map(String::as_str), Some(short));
        assert_eq!(blocks.last().map(String::as_str), Some(tail));
        assert!(blocks.iter().all(|b| char_len(b) <= 60));
    }

    #[test]
    fn test_evenly_spaced_words_are_cut_at_word_boundaries() {
        let text = "abcdefghi ".repeat(1200);
        assert_eq!(char_len(&text), 12_000);

        let blocks = split_into_blocks(&text, 4900);
        assert_eq!(blocks.len(), 3);
        for block in &blocks {
            assert!(char_len(block) <= 4900);
            assert!(block.split(' ').all(|word| word == "abcdefghi"));
        }
    }

    #[test]
    fn test_sentence_end_wins_over_space() {
        let mut chars: Vec<char> = "xxxx ".repeat(2000).chars().collect();
        chars[4850] = '.';
        let text: String = chars.into_iter().collect();

        let blocks = split_into_blocks(&text, 4900);
        assert!(blocks[0].ends_with('.'));
        assert_eq!(char_len(&blocks[0]), 4851);
        assert!(blocks.iter().all(|b| char_len(b) <= 4900));
    }

    #[test]
    fn test_single_newline_is_a_preferred_cut() {
        let text = format!("{}\n{}", "a b c d e", "f g h i j k l m n");
        let blocks = split_into_blocks(&text, 12);
        assert_eq!(blocks[0], "a b c d e");
    }

    #[test]
    fn test_unbroken_run_is_hard_cut() {
        let text = "z".repeat(25);
        let blocks = split_into_blocks(&text, 10);
        assert_eq!(blocks, vec!["z".repeat(10), "z".repeat(10), "z".repeat(5)]);
    }

    #[test]
    fn test_hard_cut_before_space_does_not_split_next_word() {
        let blocks = split_into_blocks("abcdefgh ijklmnop qr", 8);
        assert_eq!(blocks, vec!["abcdefgh", "ijklmnop", "qr"]);

        let blocks = split_into_blocks("one.two three four", 6);
        assert_eq!(blocks, vec!["one.", "two", "three", "four"]);
    }

    #[test]
    fn test_leading_space_only_falls_back_to_hard_cut() {
        assert_eq!(find_cut(&[' ', 'a', 'b']), None);
        assert_eq!(find_cut(&['a', ' ', 'b']), Some((1, 2)));
        assert_eq!(find_cut(&['a', '!', ' ', 'b']), Some((2, 2)));
    }

    #[test]
    fn test_multibyte_text_is_counted_in_chars() {
        let text = "翻译测试。".repeat(10);
        let blocks = split_into_blocks(&text, 12);
        assert!(blocks.iter().all(|b| char_len(b) <= 12));
        assert_eq!(blocks.concat(), text);
    }

    #[test]
    fn test_crlf_paragraphs_are_recognised() {
        let blocks = split_into_blocks("one\r\n\r\ntwo", 5);
        assert_eq!(blocks, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_zero_max_size_still_terminates() {
        let blocks = split_into_blocks("ab", 0);
        assert_eq!(blocks, vec!["a".to_string(), "b".to_string()]);
    }
}
