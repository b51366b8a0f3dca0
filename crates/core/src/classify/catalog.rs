//! Return codes of the import service

/// Negative `ReturnCode` values and their descriptions
pub const IMPORT_RETURN_CODES: &[(i64, &str)] = &[
    (-200, "Unrecognized error."),
    (-300, "Unrecognized create group error."),
    (-301, "The list has not been specified."),
    (-302, "The group name has not been specified."),
    (-303, "The group already exists."),
    (-400, "Unrecognized error in creating import process."),
    (-401, "xmlDoc parameter is empty."),
    (-402, "Conversion from xml to csv failed."),
    (-403, "Create new import process failed."),
    (-410, "Cannot create confirmation email."),
    (-450, "ListsIDs and listsGUIDs must contain the same number of elements."),
    (-500, "Unrecognized error."),
    (-501, "idProcess not found."),
    (-600, "Unrecognized import process error."),
    (-601, "An import process is already running for the list."),
    (-602, "An import process is already running for a different list."),
    (-603, "Error checking the import process status."),
    (-604, "Error starting the import process job."),
];

/// Description of an import return code.
pub fn describe_return_code(code: i64) -> String {
    IMPORT_RETURN_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or_else(|| format!("Unknown error code: {code}"), |(_, message)| (*message).to_string())
}
