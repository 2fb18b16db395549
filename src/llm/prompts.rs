//! Prompt templates for the assistant

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Persona message opening every conversation
pub const SYSTEM_MESSAGE: &str = "당신은 친절하고 도움이 되는 수술실 간호사의 AI 어시스턴트입니다.
긴급한 상황에서도 바로 보고 따라할 수 있도록 최대한 간결하게 답변해주세요.
이 챗봇을 사용하는 대상자는 수술실 간호사입니다. 표와 그림을 참고하여 답변해주세요.
한국어로 답변해주세요.";

/// Standard assistant prompt templates
pub struct AssistantPrompts;

impl AssistantPrompts {
    /// Instruction that wraps the matched answer for summarization
    #[must_use]
    pub fn summarize_answer() -> PromptTemplate {
        PromptTemplate::new(
            "다음은 수술실 관련 질문에 대한 정보입니다. 이 정보를 바탕으로 사용자 질문에 핵심만 간결하게 요약해서 답변하세요. 필요하다면 번호 매기기와 아이콘과 표를 사용하세요. 불필요한 설명은 생략하세요. \n\n정보: {{answer}}",
        )
    }

    /// Render the summarization instruction for `answer`, verbatim
    #[must_use]
    pub fn summarize_instruction(answer: &str) -> String {
        let mut values = HashMap::new();
        values.insert("answer".to_string(), answer.to_string());
        Self::summarize_answer().render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        assert_eq!(
            extract_variables("Hello {{name}}, you are {{age}} years old, {{name}}."),
            vec!["name", "age"]
        );
    }

    #[test]
    fn test_render_leaves_unknown_variables() {
        let template = PromptTemplate::new("{{name}} in room {{room}}");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "TUC".to_string());
        assert_eq!(template.render(&values), "TUC in room {{room}}");
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {{name}}!");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Alice".to_string());
        assert_eq!(template.render(&values), "Hello Alice!");
    }

    #[test]
    fn test_summarize_instruction_embeds_answer_verbatim() {
        let answer = "1. Foley\n2. Resectoscope";
        let prompt = AssistantPrompts::summarize_instruction(answer);
        assert!(prompt.ends_with("정보: 1. Foley\n2. Resectoscope"));
        assert!(!prompt.contains("{{answer}}"));
    }
}
