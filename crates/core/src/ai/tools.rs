//! Function-calling catalogue offered to the scheduling model

use cadence_domain::Tool;
use serde_json::json;

pub const FIND_MEETING_TIME: &str = "findMeetingTime";
pub const CHECK_DST: &str = "checkDST";
pub const VALIDATE_WORKING_HOURS: &str = "validateWorkingHours";
pub const CREATE_EVENT: &str = "createEvent";
pub const GET_AVAILABILITY: &str = "getAvailability";
pub const GET_TIMEZONE_INFO: &str = "getTimezoneInfo";
pub const ANALYZE_MEETING_CONTEXT: &str = "analyzeMeetingContext";
pub const SUGGEST_ROTATING_SCHEDULE: &str = "suggestRotatingSchedule";

/// The six tools the scheduler sends with every request
pub fn scheduling_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            FIND_MEETING_TIME,
            "Find optimal meeting times across multiple timezones. Returns ranked time slots with \
             scores based on timezone overlap, working hours, and participant availability.",
            json!({
                "type": "object",
                "properties": {
                    "participants": {
                        "type": "array",
                        "description": "Array of participant email addresses",
                        "items": {"type": "string"}
                    },
                    "duration": {
                        "type": "integer",
                        "description": "Meeting duration in minutes"
                    },
                    "dateRange": {
                        "type": "object",
                        "description": "Date range to search for meeting times",
                        "properties": {
                            "start": {"type": "string", "description": "Start date (YYYY-MM-DD)"},
                            "end": {"type": "string", "description": "End date (YYYY-MM-DD)"}
                        },
                        "required": ["start", "end"]
                    },
                    "workingHoursOnly": {
                        "type": "boolean",
                        "description": "Only consider working hours (9 AM - 5 PM)",
                        "default": true
                    }
                },
                "required": ["participants", "duration", "dateRange"]
            }),
        ),
        Tool::new(
            CHECK_DST,
            "Check if a specific time falls during a DST transition. Returns warnings for \
             ambiguous times (fall back) or invalid times (spring forward).",
            json!({
                "type": "object",
                "properties": {
                    "time": {
                        "type": "string",
                        "description": "ISO 8601 datetime (e.g., 2025-03-09T02:30:00-08:00)"
                    },
                    "timezone": {
                        "type": "string",
                        "description": "IANA timezone ID (e.g., America/Los_Angeles)"
                    }
                },
                "required": ["time", "timezone"]
            }),
        ),
        Tool::new(
            VALIDATE_WORKING_HOURS,
            "Check if a proposed meeting time falls within working hours for all participants. \
             Returns validation status and any violations.",
            json!({
                "type": "object",
                "properties": {
                    "time": {"type": "string", "description": "ISO 8601 datetime"},
                    "timezone": {"type": "string", "description": "IANA timezone ID"},
                    "workStart": {
                        "type": "string",
                        "description": "Working hours start time (HH:MM format, e.g., 09:00)",
                        "default": "09:00"
                    },
                    "workEnd": {
                        "type": "string",
                        "description": "Working hours end time (HH:MM format, e.g., 17:00)",
                        "default": "17:00"
                    }
                },
                "required": ["time", "timezone"]
            }),
        ),
        Tool::new(
            CREATE_EVENT,
            "Create a calendar event with the specified details. This actually creates the event \
             in the user's calendar.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Event title/subject"},
                    "startTime": {
                        "type": "string",
                        "description": "Event start time (ISO 8601 datetime)"
                    },
                    "endTime": {
                        "type": "string",
                        "description": "Event end time (ISO 8601 datetime)"
                    },
                    "participants": {
                        "type": "array",
                        "description": "Array of participant email addresses",
                        "items": {"type": "string"}
                    },
                    "timezone": {"type": "string", "description": "IANA timezone ID for the event"},
                    "description": {
                        "type": "string",
                        "description": "Optional event description/notes"
                    }
                },
                "required": ["title", "startTime", "endTime", "timezone"]
            }),
        ),
        Tool::new(
            GET_AVAILABILITY,
            "Get free/busy information for participants within a specified time range. Returns \
             available time slots.",
            json!({
                "type": "object",
                "properties": {
                    "participants": {
                        "type": "array",
                        "description": "Array of participant email addresses",
                        "items": {"type": "string"}
                    },
                    "startTime": {
                        "type": "string",
                        "description": "Start of availability check period (ISO 8601 datetime)"
                    },
                    "endTime": {
                        "type": "string",
                        "description": "End of availability check period (ISO 8601 datetime)"
                    }
                },
                "required": ["participants", "startTime", "endTime"]
            }),
        ),
        Tool::new(
            GET_TIMEZONE_INFO,
            "Get timezone information for a participant, including current offset, DST status, \
             and typical working hours.",
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string", "description": "Participant email address"},
                    "timezone": {
                        "type": "string",
                        "description": "IANA timezone ID (optional, will auto-detect if not provided)"
                    }
                },
                "required": ["email"]
            }),
        ),
    ]
}

/// Extra tools for context-aware and recurring scheduling
pub fn smart_scheduling_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            ANALYZE_MEETING_CONTEXT,
            "Analyze the context of a meeting request to determine priority, optimal duration, \
             and required participants based on historical patterns.",
            json!({
                "type": "object",
                "properties": {
                    "meetingType": {
                        "type": "string",
                        "description": "Type of meeting (e.g., '1-on-1', 'team', 'planning', 'client')"
                    },
                    "participants": {
                        "type": "array",
                        "description": "Participant email addresses",
                        "items": {"type": "string"}
                    },
                    "subject": {"type": "string", "description": "Meeting subject/topic"}
                },
                "required": ["meetingType"]
            }),
        ),
        Tool::new(
            SUGGEST_ROTATING_SCHEDULE,
            "Suggest a rotating meeting schedule for recurring meetings with participants across \
             multiple timezones to ensure fairness.",
            json!({
                "type": "object",
                "properties": {
                    "participants": {
                        "type": "array",
                        "description": "Participant email addresses with their timezones",
                        "items": {"type": "string"}
                    },
                    "duration": {"type": "integer", "description": "Meeting duration in minutes"},
                    "frequency": {
                        "type": "string",
                        "description": "Meeting frequency (e.g., 'weekly', 'biweekly', 'monthly')"
                    }
                },
                "required": ["participants", "duration", "frequency"]
            }),
        ),
    ]
}
