//! Offline compliment generator
//!
//! Used when the AI reply can't be obtained. The reply is picked from a pool
//! built from the message alone: a few templates that quote or measure the
//! message, plus the canned lines for the message's emotion category.

use rand::Rng;

/// Characters of the message quoted back before truncating with `...`
const PREVIEW_CHARS: usize = 20;

/// Messages longer than this get an extra "detailed story" compliment
const LONG_MESSAGE_CHARS: usize = 100;

const LONG_MESSAGE_PRAISE: &str =
    "이렇게 자세하게 이야기해주시니 정말 고마워요! 당신의 소통 능력이 훌륭해요! 💬✨";

/// Emotion category derived from keyword matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackCategory {
    Positive,
    Effort,
    Concern,
    Creative,
    General,
}

impl FallbackCategory {
    /// Categories in match priority order; `General` is the default.
    const MATCH_ORDER: [FallbackCategory; 4] = [
        FallbackCategory::Positive,
        FallbackCategory::Effort,
        FallbackCategory::Concern,
        FallbackCategory::Creative,
    ];

    /// First category with any keyword contained in `message`.
    ///
    /// Case-sensitive substring containment, first match wins.
    pub fn classify(message: &str) -> Self {
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| {
                category
                    .keywords()
                    .iter()
                    .any(|keyword| message.contains(keyword))
            })
            .unwrap_or(FallbackCategory::General)
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            FallbackCategory::Positive => &["좋", "행복", "기쁘", "즐거", "사랑", "성공", "완성", "달성"],
            FallbackCategory::Effort => &["노력", "시도", "도전", "공부", "연습", "일", "프로젝트"],
            FallbackCategory::Concern => &["걱정", "고민", "어려", "힘들", "문제", "스트레스"],
            FallbackCategory::Creative => &["만들", "그리", "쓰", "디자인", "창작", "아이디어"],
            FallbackCategory::General => &[],
        }
    }

    pub fn responses(self) -> [&'static str; 3] {
        match self {
            FallbackCategory::Positive => [
                "정말 멋진 일이네요! 당신의 긍정적인 에너지가 저에게도 전해져요! 😊💫",
                "이런 좋은 소식을 들으니 제가 다 기분이 좋아져요! 축하드려요! 🎉✨",
                "당신의 행복한 모습이 상상이 되네요! 정말 보기 좋아요! 😄💝",
            ],
            FallbackCategory::Effort => [
                "노력하시는 모습이 정말 멋져요! 당신의 열정이 느껴집니다! 💪✨",
                "이렇게 열심히 하시는 당신을 보니 존경스러워요! 👏🌟",
                "꾸준히 노력하시는 모습이 정말 인상적이에요! 응원합니다! 📚💪",
            ],
            FallbackCategory::Concern => [
                "고민을 나누어 주셔서 감사해요. 이런 걸 생각하는 당신이 정말 성숙해요! 🤗💙",
                "어려운 상황에서도 이렇게 솔직하게 말씀해 주시다니, 당신의 용기가 대단해요! 💪💫",
                "고민이 있으시군요. 그래도 이렇게 털어놓을 수 있다는 건 정말 좋은 일이에요! 🌈💝",
            ],
            FallbackCategory::Creative => [
                "창의적인 일을 하고 계시는군요! 당신의 상상력이 정말 멋져요! 🎨✨",
                "무언가를 만드시는 모습이 너무 멋있어요! 당신은 진정한 크리에이터네요! 🌟🎭",
                "아이디어가 정말 흥미로워요! 당신의 창작 능력에 감탄합니다! 💡🎪",
            ],
            FallbackCategory::General => [
                "당신과 이야기하니까 정말 즐거워요! 😊💫",
                "이런 생각을 가지신 당신이 정말 멋져요! 🌟💝",
                "당신의 이야기를 들으니 제가 다 기분이 좋아져요! ✨😄",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FallbackCategory::Positive => "positive",
            FallbackCategory::Effort => "effort",
            FallbackCategory::Concern => "concern",
            FallbackCategory::Creative => "creative",
            FallbackCategory::General => "general",
        }
    }
}

/// Every reply [`generate_with`] may return for `message`, in pool order.
pub fn candidates(message: &str) -> Vec<String> {
    let length = message.chars().count();
    let word_count = message.split_whitespace().count();

    let preview: String = message.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if length > PREVIEW_CHARS { "..." } else { "" };

    let mut pool = vec![
        format!("\"{preview}{ellipsis}\" 이런 생각을 하시다니 정말 대단해요! 💭✨"),
        format!("{word_count}개의 단어로 이렇게 멋진 이야기를 해주시네요! 당신의 표현력이 너무 좋아요! 📝💫"),
        "이런 깊이 있는 이야기를 들려주셔서 감사해요. 당신은 정말 특별한 관점을 가지고 계시네요! 🌟".to_string(),
        format!("와, {length}글자의 이야기 속에 이렇게 많은 의미가 담겨있네요! 당신의 생각이 정말 인상적이에요! 🎯"),
    ];

    if length > LONG_MESSAGE_CHARS {
        pool.push(LONG_MESSAGE_PRAISE.to_string());
    }

    let category = FallbackCategory::classify(message);
    pool.extend(category.responses().iter().map(ToString::to_string));
    pool
}

/// Pick one compliment using the thread-local RNG
#[allow(dead_code)] // For callers without their own RNG
pub fn generate(message: &str) -> String {
    generate_with(message, &mut rand::thread_rng())
}

/// Pick one compliment uniformly from the pool using `rng`
pub fn generate_with<R: Rng + ?Sized>(message: &str, rng: &mut R) -> String {
    let mut pool = candidates(message);
    // Pool always holds at least the four templates plus three canned lines
    let index = rng.gen_range(0..pool.len());
    pool.swap_remove(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_match_wins_in_priority_order() {
        // Contains both a positive (행복) and a concern (힘들) keyword
        assert_eq!(
            FallbackCategory::classify("행복하고 힘들어요"),
            FallbackCategory::Positive
        );
    }

    #[test]
    fn test_effort_keywords() {
        assert_eq!(
            FallbackCategory::classify("오늘 프로젝트를 열심히 했어요"),
            FallbackCategory::Effort
        );
        assert_eq!(
            FallbackCategory::classify("매일 연습해요"),
            FallbackCategory::Effort
        );
    }

    #[test]
    fn test_concern_and_creative() {
        assert_eq!(
            FallbackCategory::classify("시험이 걱정돼요"),
            FallbackCategory::Concern
        );
        assert_eq!(
            FallbackCategory::classify("그림을 그리는 중"),
            FallbackCategory::Creative
        );
    }

    #[test]
    fn test_general_default() {
        assert_eq!(FallbackCategory::classify("hello there"), FallbackCategory::General);
        assert_eq!(FallbackCategory::classify("안녕하세요"), FallbackCategory::General);
    }

    #[test]
    fn test_short_message_pool() {
        let pool = candidates("안녕 하세요");
        assert_eq!(pool.len(), 7);
        assert_eq!(pool[0], "\"안녕 하세요\" 이런 생각을 하시다니 정말 대단해요! 💭✨");
        assert!(pool[1].starts_with("2개의 단어로"));
        assert!(pool[3].starts_with("와, 6글자의 이야기"));
        assert_eq!(pool[4..], FallbackCategory::General.responses().map(String::from));
    }

    #[test]
    fn test_preview_truncates_at_twenty_chars() {
        let message = "가나다라마바사아자차카타파하가나다라마바사아";
        let pool = candidates(message);
        assert_eq!(
            pool[0],
            "\"가나다라마바사아자차카타파하가나다라마바...\" 이런 생각을 하시다니 정말 대단해요! 💭✨"
        );
    }

    #[test]
    fn test_long_message_gets_extra_template() {
        let message = "a".repeat(101);
        let pool = candidates(&message);
        assert_eq!(pool.len(), 8);
        assert_eq!(pool[4], LONG_MESSAGE_PRAISE);

        let at_limit = "a".repeat(100);
        assert_eq!(candidates(&at_limit).len(), 7);
    }

    #[test]
    fn test_fixed_rng_picks_first_candidate() {
        let mut rng = StepRng::new(0, 0);
        assert_eq!(
            generate_with("좋은 하루", &mut rng),
            "\"좋은 하루\" 이런 생각을 하시다니 정말 대단해요! 💭✨"
        );
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let message = "새로운 디자인을 만들었어요";
        let first = generate_with(message, &mut StdRng::seed_from_u64(7));
        let second = generate_with(message, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_draws_from_the_pool() {
        let message = "오늘 시험 공부를 열심히 했어요";
        let pool = candidates(message);
        for _ in 0..20 {
            assert!(pool.contains(&generate(message)));
        }
    }

    proptest! {
        #[test]
        fn prop_output_is_a_nonempty_candidate(message in "\\PC{1,150}") {
            prop_assume!(!message.trim().is_empty());
            let reply = generate(&message);
            prop_assert!(!reply.is_empty());
            prop_assert!(candidates(&message).contains(&reply));
        }

        #[test]
        fn prop_pool_ends_with_category_responses(message in "[가-힣a-z ]{1,120}") {
            let pool = candidates(&message);
            let category = FallbackCategory::classify(&message);
            let tail: Vec<String> = pool[pool.len() - 3..].to_vec();
            prop_assert_eq!(tail, category.responses().map(String::from).to_vec());
        }
    }
}
