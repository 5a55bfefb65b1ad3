// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Prompt packs.
//!
//! A pack holds every piece of natural language the pipeline emits or
//! inspects for one locale: the chunk and synthesis prompts, the phrases that
//! mark a chunk answer as "nothing found", and the fixed answers used when
//! there is nothing to synthesize. Packs are data: a config file can select a
//! built-in locale and override any field.
//!
//! Templates use `{name}` placeholders. Chunk templates take `{question}` and
//! `{chunk}`, synthesis templates take `{question}` and `{answers}`, error
//! templates take `{error}`.

use anyhow::Result;

use crate::config::PromptsConfig;

pub const DEFAULT_LOCALE: &str = "ko";

const KO_CHUNK_SYSTEM: &str = "정확한 정보만 제공하는 특허 분석 전문가";

const KO_CHUNK_TEMPLATE: &str =
    "당신은 특허 전문가입니다. 다음 문서 내용을 바탕으로 질문에 답변해주세요.
문서에 없는 내용은 추측하지 말고, 문서에 명시된 내용만을 사용하세요.

문서 내용:
{chunk}

질문: {question}

답변:";

const KO_SYNTHESIS_SYSTEM: &str =
    "여러 출처의 정보를 자연스럽게 통합하여 하나의 완결된 전문가 답변을 제공하는 특허 분석 전문가";

const KO_SYNTHESIS_TEMPLATE: &str =
    "당신은 특허 전문가입니다. 다음은 여러 특허 문서에서 추출한 정보들입니다.
이 정보들을 바탕으로 질문에 대해 자연스럽고 유기적인 하나의 답변을 작성해주세요.

중요:
- \"첫 번째 특허에서는...\", \"다른 특허에서는...\" 같은 구분 표현을 사용하지 마세요
- 마치 하나의 완전한 문서를 읽고 답변하는 것처럼 자연스럽게 작성하세요
- 여러 출처의 내용을 매끄럽게 통합하여 전문가 답변으로 제시하세요
- 반복되는 내용은 한 번만 언급하고, 상충되는 정보가 있다면 통합적으로 설명하세요
- 출처나 출원번호 정보는 포함하지 마세요

질문: {question}

참고 정보:
{answers}

답변 (자연스럽고 통합된 하나의 답변):";

const KO_MARKERS: &[&str] = &[
    "찾을 수 없습니다",
    "정보가 없습니다",
    "언급되지 않습니다",
    "나와 있지 않습니다",
    "확인할 수 없습니다",
];

const EN_CHUNK_SYSTEM: &str = "A patent analyst who only provides accurate information";

const EN_CHUNK_TEMPLATE: &str =
    "You are a patent expert. Answer the question using the document excerpt below.
Do not speculate about anything the excerpt does not contain; use only what it states explicitly.

Document excerpt:
{chunk}

Question: {question}

Answer:";

const EN_SYNTHESIS_SYSTEM: &str =
    "A patent analyst who merges information from several sources into one complete expert answer";

const EN_SYNTHESIS_TEMPLATE: &str =
    "You are a patent expert. Below is information extracted from several patent documents.
Write one natural, cohesive answer to the question based on it.

Important:
- Do not use distinguishing phrases such as \"the first patent says...\" or \"another patent says...\"
- Write as if you had read one complete document
- Merge the content of all sources seamlessly into an expert answer
- Mention repeated facts only once, and reconcile conflicting statements in a single explanation
- Do not include sources, citations or application numbers

Question: {question}

Reference information:
{answers}

Answer (one natural, integrated answer):";

const EN_MARKERS: &[&str] = &[
    "cannot be found",
    "no information",
    "not mentioned",
    "does not mention",
    "not specified",
    "cannot be confirmed",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PromptPack {
    pub locale: String,
    pub chunk_system: String,
    pub chunk_template: String,
    pub synthesis_system: String,
    pub synthesis_template: String,
    /// Stored lowercase
    pub marker_phrases: Vec<String>,
    pub no_documents_answer: String,
    pub no_information_answer: String,
    pub chunk_error_template: String,
    pub synthesis_error_template: String,
}

impl PromptPack {
    /// Built-in pack for `locale`, if there is one
    pub fn builtin(locale: &str) -> Option<Self> {
        let pack = match locale.to_lowercase().as_str() {
            "ko" => Self {
                locale: "ko".to_string(),
                chunk_system: KO_CHUNK_SYSTEM.to_string(),
                chunk_template: KO_CHUNK_TEMPLATE.to_string(),
                synthesis_system: KO_SYNTHESIS_SYSTEM.to_string(),
                synthesis_template: KO_SYNTHESIS_TEMPLATE.to_string(),
                marker_phrases: lowercase_all(KO_MARKERS.iter().copied()),
                no_documents_answer: "관련 특허 문서를 찾을 수 없습니다.".to_string(),
                no_information_answer: "해당 질문에 대한 정보를 찾을 수 없습니다.".to_string(),
                chunk_error_template: "오류 발생: {error}".to_string(),
                synthesis_error_template: "답변 종합 중 오류: {error}".to_string(),
            },
            "en" => Self {
                locale: "en".to_string(),
                chunk_system: EN_CHUNK_SYSTEM.to_string(),
                chunk_template: EN_CHUNK_TEMPLATE.to_string(),
                synthesis_system: EN_SYNTHESIS_SYSTEM.to_string(),
                synthesis_template: EN_SYNTHESIS_TEMPLATE.to_string(),
                marker_phrases: lowercase_all(EN_MARKERS.iter().copied()),
                no_documents_answer: "No relevant patent documents were found.".to_string(),
                no_information_answer: "No information about this question could be found."
                    .to_string(),
                chunk_error_template: "Error while answering: {error}".to_string(),
                synthesis_error_template: "Error while combining answers: {error}".to_string(),
            },
            _ => return None,
        };
        Some(pack)
    }

    /// Built-in pack of the configured locale with config overrides applied
    pub fn from_config(config: &PromptsConfig) -> Result<Self> {
        let locale = config.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        let mut pack = Self::builtin(locale)
            .ok_or_else(|| anyhow::anyhow!("Unknown prompt locale: {}", locale))?;

        let overrides = [
            (&mut pack.chunk_system, &config.chunk_system),
            (&mut pack.chunk_template, &config.chunk_template),
            (&mut pack.synthesis_system, &config.synthesis_system),
            (&mut pack.synthesis_template, &config.synthesis_template),
            (&mut pack.no_documents_answer, &config.no_documents_answer),
            (&mut pack.no_information_answer, &config.no_information_answer),
            (&mut pack.chunk_error_template, &config.chunk_error_template),
            (&mut pack.synthesis_error_template, &config.synthesis_error_template),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        if let Some(markers) = &config.marker_phrases {
            pack.marker_phrases = lowercase_all(markers.iter().map(String::as_str));
        }

        pack.validate()?;
        Ok(pack)
    }

    fn validate(&self) -> Result<()> {
        for placeholder in ["{question}", "{chunk}"] {
            if !self.chunk_template.contains(placeholder) {
                anyhow::bail!("prompts.chunk_template must contain {}", placeholder);
            }
        }
        for placeholder in ["{question}", "{answers}"] {
            if !self.synthesis_template.contains(placeholder) {
                anyhow::bail!("prompts.synthesis_template must contain {}", placeholder);
            }
        }
        if self.marker_phrases.iter().all(|p| p.trim().is_empty()) {
            anyhow::bail!("prompts.marker_phrases must contain at least one phrase");
        }
        Ok(())
    }

    pub fn chunk_prompt(&self, question: &str, chunk: &str) -> String {
        render(
            &self.chunk_template,
            &[("question", question), ("chunk", chunk)],
        )
    }

    pub fn synthesis_prompt(&self, question: &str, answers: &str) -> String {
        render(
            &self.synthesis_template,
            &[("question", question), ("answers", answers)],
        )
    }

    pub fn chunk_error(&self, error: &str) -> String {
        render(&self.chunk_error_template, &[("error", error)])
    }

    pub fn synthesis_error(&self, error: &str) -> String {
        render(&self.synthesis_error_template, &[("error", error)])
    }

    /// True when `answer` contains any marker phrase, ignoring case
    pub fn is_no_information(&self, answer: &str) -> bool {
        let answer = answer.to_lowercase();
        self.marker_phrases
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| answer.contains(p.as_str()))
    }
}

fn lowercase_all<'a>(phrases: impl Iterator<Item = &'a str>) -> Vec<String> {
    phrases.map(|p| p.trim().to_lowercase()).collect()
}

/// Substitute `{name}` placeholders in one pass. Substituted values are never
/// rescanned, so a question containing `{chunk}` stays literal.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after
            .find('}')
            .and_then(|end| {
                let name = &after[..end];
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, end))
            });

        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
