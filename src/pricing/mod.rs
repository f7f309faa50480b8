/// 메시지 가격 계산기
/// 클라이언트 미리보기와 서버 청구가 같은 함수를 사용한다.
// region:    --- Imports
use crate::auction::model::Money;
use serde::{Deserialize, Serialize};

pub mod charge;

// endregion: --- Imports

// region:    --- Constants
const MIN_TEXT_COST: Money = Money::from_dollars(40);
const COMPLEX_FREE_CHARS: usize = 7;
const COMPLEX_PER_CHAR: Money = Money::from_dollars(5);
const FLAT_TIER_LIMIT: usize = 18;
const MIDDLE_TIER_LIMIT: usize = 28;
const MIDDLE_TIER_PER_CHAR: Money = Money::from_dollars(2);
const TOP_TIER_BASE: Money = Money::from_dollars(60);
const TOP_TIER_PER_CHAR: Money = Money::from_dollars(5);
const QUICK_COST: Money = Money::from_dollars(30);
const VIDEO_COST: Money = Money::from_dollars(100);

/// 한자, 가나, 한글 음절, 태국 문자, 조지아 문자
const COMPLEX_SCRIPT_RANGES: [(char, char); 5] = [
    ('\u{4E00}', '\u{9FFF}'),
    ('\u{3040}', '\u{30FF}'),
    ('\u{AC00}', '\u{D7AF}'),
    ('\u{0E00}', '\u{0E7F}'),
    ('\u{10A0}', '\u{10FF}'),
];

// endregion: --- Constants

// region:    --- Calculator
/// 가격 계산 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCharge {
    pub base_cost: Money,
    pub text_cost: Money,
    pub quick_cost: Money,
    pub video_cost: Money,
    pub total: Money,
}

/// 복잡한 문자 체계 포함 여부 (한 글자만 있어도 해당)
pub fn is_complex_script(text: &str) -> bool {
    text.chars().any(|c| {
        COMPLEX_SCRIPT_RANGES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&c))
    })
}

/// 글자 수 (UTF-16 코드 유닛 기준, 브라우저 문자열 길이와 동일)
pub fn char_count(text: &str) -> usize {
    text.encode_utf16().count()
}

/// 텍스트 비용
pub fn text_cost(text: &str) -> Money {
    if text.is_empty() {
        return Money::ZERO;
    }
    let count = char_count(text);

    if is_complex_script(text) {
        let extra = count.saturating_sub(COMPLEX_FREE_CHARS) as i64;
        return MIN_TEXT_COST + Money::from_cents(COMPLEX_PER_CHAR.cents() * extra);
    }

    if count <= FLAT_TIER_LIMIT {
        MIN_TEXT_COST
    } else if count <= MIDDLE_TIER_LIMIT {
        let extra = (count - FLAT_TIER_LIMIT) as i64;
        MIN_TEXT_COST + Money::from_cents(MIDDLE_TIER_PER_CHAR.cents() * extra)
    } else {
        let extra = (count - MIDDLE_TIER_LIMIT) as i64;
        TOP_TIER_BASE + Money::from_cents(TOP_TIER_PER_CHAR.cents() * extra)
    }
}

/// 메시지 총 비용 계산
pub fn compute_cost(text: &str, base_cost: Money, quick: bool, video: bool) -> MessageCharge {
    let text_cost = text_cost(text);
    let quick_cost = if quick { QUICK_COST } else { Money::ZERO };
    let video_cost = if video { VIDEO_COST } else { Money::ZERO };

    MessageCharge {
        base_cost,
        text_cost,
        quick_cost,
        video_cost,
        total: base_cost + text_cost + quick_cost + video_cost,
    }
}

// endregion: --- Calculator

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(d: i64) -> Money {
        Money::from_dollars(d)
    }

    #[test]
    fn test_complex_script_short_text() {
        let charge = compute_cost("你好", dollars(50), false, false);
        assert_eq!(charge.text_cost, dollars(40));
        assert_eq!(charge.total, dollars(90));
    }

    #[test]
    fn test_middle_tier_with_addons() {
        let text = "Hello there friend!!!";
        assert_eq!(char_count(text), 21);
        let charge = compute_cost(text, Money::ZERO, true, true);
        assert_eq!(charge.text_cost, dollars(46));
        assert_eq!(charge.quick_cost, dollars(30));
        assert_eq!(charge.video_cost, dollars(100));
        assert_eq!(charge.total, dollars(176));
    }

    #[test]
    fn test_twenty_ascii_chars() {
        let charge = compute_cost("Hello there friend!!", Money::ZERO, true, true);
        assert_eq!(charge.text_cost, dollars(42));
        assert_eq!(charge.total, dollars(172));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(text_cost(&"a".repeat(18)), dollars(40));
        assert_eq!(text_cost(&"a".repeat(19)), dollars(42));
        assert_eq!(text_cost(&"a".repeat(28)), dollars(60));
        assert_eq!(text_cost(&"a".repeat(29)), dollars(65));
    }

    #[test]
    fn test_complex_script_long_text() {
        // 한글 10자: 40 + (10 - 7) * 5
        assert_eq!(text_cost("가나다라마바사아자차"), dollars(55));
        // 라틴 문자 사이에 가나 한 글자만 있어도 적용
        assert_eq!(text_cost("abcdefghij\u{3042}"), dollars(60));
        assert!(is_complex_script("მ"));
        assert!(is_complex_script("สวัสดี"));
        assert!(!is_complex_script("Привет"));
    }

    #[test]
    fn test_empty_text_costs_nothing() {
        let charge = compute_cost("", dollars(25), false, false);
        assert_eq!(charge.text_cost, Money::ZERO);
        assert_eq!(charge.total, dollars(25));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let a = compute_cost("Happy birthday from all of us!", dollars(12), true, false);
        let b = compute_cost("Happy birthday from all of us!", dollars(12), true, false);
        assert_eq!(a, b);
    }
}
