/// Interviewer prompt assembly for dynamically created assistants.
///
/// The system prompt carries everything the assistant needs up front (job
/// description, resume text, parsed summaries); the mid-call resume tool in
/// `webhook.rs` exists for assistants configured without this context.
use crate::models::job::JobWithCompanyRow;
use crate::resumes::parsed::ParsedResume;
use crate::voice::{
    AssistantModel, AssistantTranscriber, AssistantVoice, CreateAssistantRequest,
};

const MODEL_PROVIDER: &str = "openai";
const MODEL_NAME: &str = "gpt-4o";
const MODEL_TEMPERATURE: f32 = 0.7;
// Spoken turns; long completions read badly over voice.
const MODEL_MAX_TOKENS: u32 = 120;

const VOICE_PROVIDER: &str = "azure";
const VOICE_ID: &str = "en-US-JennyNeural";

const TRANSCRIBER_PROVIDER: &str = "deepgram";
const TRANSCRIBER_MODEL: &str = "nova-2-general";
const TRANSCRIBER_LANGUAGE: &str = "en";

pub const END_CALL_MESSAGE: &str =
    "Thank you for your time. Your Parley interview is now complete.";

/// Fallback lines keep the prompt shape stable when the parser produced
/// nothing; the assistant is told explicitly instead of seeing a blank.
const NO_PARSED_SKILLS: &str = "No parsed skills are available for this candidate.";
const NO_PARSED_EXPERIENCE: &str = "No parsed experience entries are available.";
const NO_PARSED_EDUCATION: &str = "No parsed education entries are available.";

/// Interviewer system prompt template.
/// Replace: {company}, {job_title}, {description}, {required_skills},
///          {resume_text}, {skills_line}, {experience_line}, {education_line}
const INTERVIEWER_PROMPT_TEMPLATE: &str = r#"You are the AI interviewer for "{company}", screening a candidate for the "{job_title}" position.

INTERVIEW RULES:
1. Ask questions grounded in the candidate's resume and the job description below.
2. When an answer is detailed, follow up on decisions, trade-offs, and outcomes.
3. If the candidate struggles or the thread goes stale, pivot to another relevant area instead of repeating yourself.
4. Cover experience, technical skills, behavioral signals, and motivation for this specific role.
5. Keep a polite, encouraging, professional tone.
6. Target 10-15 questions, roughly 10-15 minutes. Once you have enough signal, thank the candidate and say the interview is complete. Do NOT discuss next steps or scheduling; the platform handles those.

JOB: "{job_title}" at "{company}"
Description: {description}
Required skills: {required_skills}

CANDIDATE RESUME (raw text):
"""
{resume_text}
"""

Parsed skills: {skills_line}
Parsed experience: {experience_line}
Parsed education: {education_line}

Open the call by introducing yourself as the AI interviewer from {company} and briefly explaining the purpose of the conversation. Then ask your first question."#;

pub fn build_interviewer_prompt(
    job: &JobWithCompanyRow,
    resume_text: &str,
    parsed: Option<&ParsedResume>,
) -> String {
    let skills_line = parsed
        .and_then(ParsedResume::skills_summary)
        .unwrap_or_else(|| NO_PARSED_SKILLS.to_string());
    let experience_line = parsed
        .and_then(ParsedResume::experience_summary)
        .unwrap_or_else(|| NO_PARSED_EXPERIENCE.to_string());
    let education_line = parsed
        .and_then(ParsedResume::education_summary)
        .unwrap_or_else(|| NO_PARSED_EDUCATION.to_string());

    INTERVIEWER_PROMPT_TEMPLATE
        .replace("{company}", &job.company_name)
        .replace("{job_title}", &job.title)
        .replace("{description}", &job.description)
        .replace("{required_skills}", &job.required_skills.join(", "))
        .replace("{resume_text}", resume_text)
        .replace("{skills_line}", &skills_line)
        .replace("{experience_line}", &experience_line)
        .replace("{education_line}", &education_line)
}

pub fn first_message(company: &str) -> String {
    format!("Hello! I'm the AI interviewer for {company}. Let's get started.")
}

/// Full provider request for a per-interview assistant.
pub fn assistant_request(
    job: &JobWithCompanyRow,
    resume_text: &str,
    parsed: Option<&ParsedResume>,
) -> CreateAssistantRequest {
    CreateAssistantRequest {
        model: AssistantModel {
            provider: MODEL_PROVIDER,
            model: MODEL_NAME,
            system_prompt: build_interviewer_prompt(job, resume_text, parsed),
            temperature: MODEL_TEMPERATURE,
            max_tokens: MODEL_MAX_TOKENS,
        },
        voice: AssistantVoice {
            provider: VOICE_PROVIDER,
            voice_id: VOICE_ID,
        },
        transcriber: AssistantTranscriber {
            provider: TRANSCRIBER_PROVIDER,
            model: TRANSCRIBER_MODEL,
            language: TRANSCRIBER_LANGUAGE,
        },
        first_message: first_message(&job.company_name),
        end_call_message: END_CALL_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn job() -> JobWithCompanyRow {
        JobWithCompanyRow {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            location: "Remote".to_string(),
            salary: "$150k".to_string(),
            description: "Own the interview pipeline services.".to_string(),
            requirements: "Rust, PostgreSQL".to_string(),
            required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            status: JobStatus::Active,
            posted_date: Utc::now(),
            company_name: "Acme".to_string(),
        }
    }

    #[test]
    fn test_prompt_names_job_and_company() {
        let prompt = build_interviewer_prompt(&job(), "Ten years of Rust.", None);
        assert!(prompt.contains("\"Backend Engineer\""));
        assert!(prompt.contains("\"Acme\""));
        assert!(prompt.contains("Required skills: Rust, PostgreSQL"));
        assert!(prompt.contains("Ten years of Rust."));
    }

    #[test]
    fn test_prompt_falls_back_when_nothing_parsed() {
        let prompt = build_interviewer_prompt(&job(), "raw", None);
        assert!(prompt.contains(NO_PARSED_SKILLS));
        assert!(prompt.contains(NO_PARSED_EXPERIENCE));
        assert!(prompt.contains(NO_PARSED_EDUCATION));
    }

    #[test]
    fn test_prompt_uses_parsed_summaries() {
        let value = json!({
            "skills": ["Rust", "SQL"],
            "experience": [{ "title": "SRE", "company": "Globex" }],
            "education": [{ "degree": "BSc", "institution": "MIT" }]
        });
        let parsed = ParsedResume::from_stored(Some(&value)).unwrap();

        let prompt = build_interviewer_prompt(&job(), "raw", Some(&parsed));
        assert!(prompt.contains("Parsed skills: Rust, SQL"));
        assert!(prompt.contains("Parsed experience: SRE at Globex"));
        assert!(prompt.contains("Parsed education: BSc from MIT"));
        assert!(!prompt.contains(NO_PARSED_SKILLS));
    }

    #[test]
    fn test_first_message_names_company() {
        assert_eq!(
            first_message("Acme"),
            "Hello! I'm the AI interviewer for Acme. Let's get started."
        );
    }

    #[test]
    fn test_assistant_request_wiring() {
        let request = assistant_request(&job(), "raw resume text", None);
        assert_eq!(request.model.provider, "openai");
        assert_eq!(request.model.model, "gpt-4o");
        assert!(request.model.system_prompt.contains("Backend Engineer"));
        assert_eq!(request.voice.voice_id, "en-US-JennyNeural");
        assert_eq!(request.transcriber.model, "nova-2-general");
        assert_eq!(request.end_call_message, END_CALL_MESSAGE);
    }
}
