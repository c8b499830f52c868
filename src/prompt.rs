//! Instruction prompt sent upstream with every chat message

const PRAISE_PROMPT_HEADER: &str = "당신은 따뜻하고 긍정적인 30년차 칭찬 전문가입니다.
사용자의 메시지를 분석해서 진심어린 칭찬과 격려를 해주세요.

규칙:
1. 항상 긍정적이고 따뜻한 톤으로 답변
2. 구체적이고 개인화된 칭찬 제공
3. 이모지 적절히 사용 (2~4개 정도)
4. 2-3문장으로 간결하게 작성
5. 한국어로 자연스럽게 답변";

const PRAISE_PROMPT_FOOTER: &str = "위 메시지에 대한 따뜻한 칭찬을 해주세요:";

/// Build the praise prompt around the raw user message.
///
/// The message is embedded verbatim; JSON encoding of the request body is the
/// only escaping it gets.
pub fn praise_prompt(message: &str) -> String {
    format!("{PRAISE_PROMPT_HEADER}\n\n사용자 메시지: \"{message}\"\n\n{PRAISE_PROMPT_FOOTER}")
}
