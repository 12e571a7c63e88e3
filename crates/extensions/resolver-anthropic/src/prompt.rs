//! Prompt construction.

use smartfill_protocols::ResolveRequest;

use crate::form_type::FormType;

const INTRO: &str = "You are an advanced AI form-filling assistant with expertise in \
context-aware field mapping. Your task is to intelligently fill forms based on user \
profile data and form context.";

const INSTRUCTIONS: &str = r#"CONTEXT-AWARE FILLING INSTRUCTIONS:

**For JOB APPLICATIONS:**
- Use professional profile data (experience, skills, expectedSalary, etc.)
- Fill cover letter fields with customized content using profile.coverLetter template
- Use work authorization status, availability, notice period appropriately
- Match skills to job requirements when possible

**For SURVEYS/DEMOGRAPHICS:**
- Use personal information fields (gender, ethnicity, dateOfBirth, etc.) when appropriate
- Respect privacy - only fill demographic fields that seem relevant
- Use professional background for work-related surveys

**For CONTACT/REGISTRATION FORMS:**
- Prioritize basic contact info (name, email, phone, address)
- Use social profiles (linkedin, github, portfolio) for professional contexts
- Fill company/job title for business registrations

**INTELLIGENT FIELD MAPPING:**
- Salary fields: Use currentSalary or expectedSalary based on context
- Experience fields: Use profile.experience (e.g., "3-5 years")
- Skills/Technologies: Use profile.skills (comma-separated list)
- Education: Use profile.education, profile.university, profile.graduationYear
- Bio/About fields: Use profile.customBio or generate from other profile data
- Cover letter fields: Use profile.coverLetter template, replace {company} and {position} with detected values
- Social links: Use appropriate profile.linkedin, profile.github, profile.portfolio, profile.twitter
- Work authorization: Use profile.workAuthorization
- Availability: Use profile.availability
- Notice period: Use profile.noticePeriod

**SMART DEFAULTS:**
- For dropdown/select fields, choose the most appropriate option based on profile
- For yes/no questions, make intelligent decisions based on context
- For date fields, use appropriate format (MM/DD/YYYY, DD/MM/YYYY, etc.)
- For phone fields, format appropriately

**RULES:**
1. Analyze each field's label, name, placeholder, and type to determine the best profile match
2. Be context-aware - job applications need different data than surveys
3. If no suitable profile data exists, return empty string ""
4. For file upload fields, always return ""
5. Return ONLY a valid JSON object mapping field IDs to string values
6. Be intelligent about field variations (e.g., "first_name", "firstName", "fname" all map to profile.name)

RESPONSE FORMAT (JSON only):
{
  "field_id_1": "appropriate_value",
  "field_id_2": "another_value"
}"#;

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Build the single user message sent to the model.
pub fn build_prompt(form_type: FormType, request: &ResolveRequest) -> String {
    format!(
        "{intro}\n\n\
         FORM TYPE DETECTED: {form_type}\n\n\
         USER PROFILE:\n{profile}\n\n\
         FORM CONTEXT:\n\
         URL: {url}\n\
         Page Title: {title}\n\
         Detected Type: {form_type}\n\n\
         FORM FIELDS:\n{fields}\n\n\
         {instructions}\n",
        intro = INTRO,
        form_type = form_type,
        profile = pretty(&request.profile),
        url = request.context.url,
        title = request.context.title,
        fields = pretty(&request.fields),
        instructions = INSTRUCTIONS,
    )
}
