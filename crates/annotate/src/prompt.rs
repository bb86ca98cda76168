/// Prompt for the structured per-story annotation call.
pub fn build_annotation_prompt(title: &str, content: &str) -> String {
    format!(
        r#"
Extract ALL named entities and detailed metadata from PUBLIC SAFETY news stories and return them in JSON format.

CONTEXT: This story is from the Public Safety beat covering law enforcement, fire departments, emergency services, courts, crime, accidents, and public safety-related news.

Extract the following entities and metadata:

**NAMED ENTITIES:**

- people: Array of IMPORTANT people mentioned in the story. Include their name and title/role/description when available:
  * Law enforcement officers: Include rank and agency (e.g., "Chief John Smith, Easton Police Department")
  * Fire and EMS personnel: Include rank and department
  * Court officials: Include role and jurisdiction
  * Suspects/defendants: Include name and any details stated (e.g., "James Wilson, 35, of Easton")
  * Victims: Include if named
  * Public officials: Include title and organization
  Format: "First Last, Title/Role" or "First Last, age, description" as appropriate

- places: Array of geographic locations mentioned within Maryland Eastern Shore:
  * Cities/Towns: Include state (e.g., "Easton, Maryland")
  * Counties: Use format "Talbot County, Maryland"
  * Specific locations: Roads, buildings, facilities (e.g., "Route 50", "Easton Police Department")

- organizations: Array of RELEVANT organizations, institutions, and agencies mentioned:
  * Law enforcement agencies (e.g., "Easton Police Department", "Maryland State Police")
  * Fire departments and EMS
  * Courts and legal institutions
  * Government agencies
  Use full official names when possible

**CONTENT CLASSIFICATION:**

- primary_theme: The main topic/category of the story. Choose ONE from:
  * "traffic accidents"
  * "violent crime"
  * "fire/rescue"
  * "emergency services"
  * "court proceedings"
  * "law enforcement operations"
  * "public safety policy"
  * "community safety"
  * "weather emergencies"
  * If none fit, return "Other" and include a brief descriptive label

- secondary_themes: List of additional themes (articles often cover multiple issues). Use any relevant from above list.

- incident_type: More specific description of incident (e.g., "pedestrian fatality", "armed robbery", "house fire", "DUI checkpoint", "missing person", "drug arrest", etc.)

- severity_level: Based on injuries, damage, response. Choose ONE: "minor", "moderate", "major"

**GEOGRAPHIC INFORMATION:**

- location: Specific neighborhood/district where incident occurred (if mentioned)
- location_type: Type of location. Choose ONE: "residential", "commercial", "highway", "rural road", "park", "school zone", "government building", "waterfront", "other", or null if not specified

**CONTEXTUAL DETAILS:**

- time_of_incident: If time is mentioned in story, extract it (e.g., "morning", "early morning", "afternoon"). Use null if not mentioned.
- weather_conditions: If weather is relevant/mentioned (e.g., "rainy", "snowy", "foggy", "clear"). Use null if not mentioned.
- response_agencies: List of agencies that responded. Choose from: "police", "fire", "EMS", "state police", "coast guard", "multiple", or create list like ["police", "fire"]
- outcome: Current status. Choose ONE: "arrest made", "under investigation", "resolved", "ongoing", "charges filed", "no charges", or describe briefly

IMPORTANT RULES:
- Do NOT include news organizations, reporters, photographers, or byline names
- Be thorough and specific
- Use null for fields where information is not available or not mentioned
- For arrays, use [] if no information found

Example output:
{{
  "people": ["Chief Chris Thomas, St. Michaels Volunteer Fire Department", "Officer John Doe, Easton Police"],
  "places": ["St. Michaels, Maryland", "Talbot County, Maryland", "Route 50"],
  "organizations": ["St. Michaels Volunteer Fire Department", "Easton Police Department", "Maryland State Police"],
  "primary_theme": "fire/rescue",
  "secondary_themes": ["emergency services"],
  "incident_type": "structure fire",
  "severity_level": "major",
  "location": "downtown St. Michaels",
  "location_type": "commercial",
  "time_of_incident": "2:30 a.m.",
  "weather_conditions": "foggy",
  "response_agencies": ["fire", "EMS"],
  "outcome": "resolved"
}}

Story Title: {title}
Story Content: {content}

Return only valid JSON with all the fields above. Use null or [] as appropriate for missing information:
"#
    )
}

/// Prompt for the quote-preserving summary call. The answer is plain
/// text, not JSON.
pub fn build_summary_prompt(title: &str, content: &str) -> String {
    format!(
        r#"
Summarize this PUBLIC SAFETY news story in a concise way (2-5 paragraphs) while RETAINING ALL DIRECT QUOTES from the original story.

CRITICAL REQUIREMENTS:
1. Include EVERY direct quote from the original story - do not paraphrase or omit any quotes
2. Keep quotes in their original context
3. Preserve the speaker attribution for each quote
4. Maintain the factual accuracy of all details
5. Keep the summary focused on the key facts: who, what, when, where, why, how
6. Organize information chronologically if appropriate
7. Include relevant names, locations, and organizations
8. Retain specific numbers, dates, and times mentioned

Do NOT include any meta-commentary like "this article discusses" - just provide the summary with integrated quotes.

Story Title: {title}
Story Content: {content}

Provide the summary as plain text (not JSON):
"#
    )
}
