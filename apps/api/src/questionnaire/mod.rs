// Questionnaire wizard: answers, step state machine, and the query-string
// contract handed to the results viewer.

pub mod answers;
pub mod handlers;
pub mod query;
pub mod wizard;
