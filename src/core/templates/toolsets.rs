//! Preset tool sets.

use crate::core::tools::{FunctionResponseScheduling, Schema, ToolDeclaration};

pub(super) fn customer_support() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration::new(
            "start_return",
            "Starts the return process for an item, collecting necessary details from the user.",
            Schema::object(
                [
                    ("orderId", Schema::string("The ID of the order containing the item to be returned.")),
                    ("itemName", Schema::string("The name of the item the user wants to return.")),
                    ("reason", Schema::string("The reason the user is returning the item.")),
                ],
                &["orderId", "itemName", "reason"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "get_order_status",
            "Provides the current status of a user's order, searching by order ID or customer details.",
            Schema::object(
                [
                    ("orderId", Schema::string("The ID of the order to check. Ask for this first.")),
                    ("customerName", Schema::string("The name of the customer, if order ID is not available.")),
                    ("customerEmail", Schema::string("The email of the customer, if order ID is not available.")),
                ],
                &[],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "speak_to_representative",
            "Escalates the conversation to a human customer support representative.",
            Schema::object(
                [(
                    "reason",
                    Schema::string("A brief summary of the user's issue for the representative."),
                )],
                &["reason"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
    ]
}

pub(super) fn personal_assistant() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration::new(
            "create_calendar_event",
            "Creates a new event in the user's calendar.",
            Schema::object(
                [
                    ("summary", Schema::string("The title or summary of the event.")),
                    ("location", Schema::string("The location of the event.")),
                    ("startTime", Schema::string("The start time of the event in ISO 8601 format.")),
                    ("endTime", Schema::string("The end time of the event in ISO 8601 format.")),
                ],
                &["summary", "startTime", "endTime"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "send_email",
            "Sends an email to a specified recipient.",
            Schema::object(
                [
                    ("recipient", Schema::string("The email address of the recipient.")),
                    ("subject", Schema::string("The subject line of the email.")),
                    ("body", Schema::string("The body content of the email.")),
                ],
                &["recipient", "subject", "body"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "set_reminder",
            "Sets a reminder for the user.",
            Schema::object(
                [
                    ("task", Schema::string("The task for the reminder.")),
                    ("time", Schema::string("The time for the reminder in ISO 8601 format.")),
                ],
                &["task", "time"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
    ]
}

pub(super) fn navigation_system() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration::new(
            "find_route",
            "Finds a route to a specified destination.",
            Schema::object(
                [
                    ("destination", Schema::string("The destination address or landmark.")),
                    (
                        "modeOfTransport",
                        Schema::enumeration(
                            "The mode of transport.",
                            &["driving", "walking", "cycling", "transit"],
                        ),
                    ),
                ],
                &["destination"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "find_nearby_places",
            "Finds nearby places of a certain type.",
            Schema::object(
                [
                    ("placeType", Schema::string("The type of place to search for, e.g. restaurant.")),
                    ("radius", Schema::number("The search radius in kilometers.")),
                ],
                &["placeType"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "get_traffic_info",
            "Gets real-time traffic information for a specified location.",
            Schema::object(
                [(
                    "location",
                    Schema::string("The location to get traffic information for."),
                )],
                &["location"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
    ]
}

pub(super) fn tmbr() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration::new(
            "search_reference",
            "Looks up public reference material: documentation, published advisories, or background facts.",
            Schema::object(
                [
                    ("query", Schema::string("The search terms or exact identifier to look up.")),
                    (
                        "layer",
                        Schema::enumeration(
                            "Where to look.",
                            &["surface", "technical", "academic"],
                        ),
                    ),
                ],
                &["query", "layer"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "draft_code_snippet",
            "Drafts a code snippet for the user to review. Nothing is executed.",
            Schema::object(
                [
                    ("language", Schema::string("The snippet language, e.g. Python, Bash, SQL.")),
                    ("logic", Schema::string("What the snippet should do.")),
                ],
                &["language", "logic"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "analyze_data_stream",
            "Summarizes a dataset or metrics stream the user has shared on screen.",
            Schema::object(
                [
                    ("dataset_stream", Schema::string("Name or identifier of the dataset.")),
                    (
                        "mode",
                        Schema::enumeration(
                            "Kind of analysis.",
                            &["summary", "trend", "anomaly"],
                        ),
                    ),
                ],
                &["dataset_stream", "mode"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
        ToolDeclaration::new(
            "query_public_api",
            "Reads data from a public platform API on the user's behalf.",
            Schema::object(
                [
                    ("target_platform", Schema::string("The platform to query, e.g. GitHub.")),
                    ("resource", Schema::string("The resource to fetch.")),
                    ("page_size", Schema::integer("Maximum number of records to return.")),
                ],
                &["target_platform", "resource"],
            ),
        )
        .with_scheduling(FunctionResponseScheduling::Interrupt),
    ]
}
