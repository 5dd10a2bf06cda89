//! Eligibility matching: a pure conjunctive threshold filter over postings.
//! No ranking, no partial credit; a seeker either clears every bar or the
//! posting is skipped.

use crate::models::{JobPosting, SeekerProfile};

/// Return the postings whose role matches `desired_role` (case-insensitive)
/// and whose experience/mini/major thresholds the seeker meets or exceeds.
///
/// Input order is preserved. Deadlines are ignored here: a posting past its
/// deadline still matches, so seekers can see closed openings they would
/// have qualified for. Open/closed is display information only.
pub fn match_postings(
    postings: &[JobPosting],
    desired_role: &str,
    seeker: &SeekerProfile,
) -> Vec<JobPosting> {
    postings
        .iter()
        .filter(|p| p.role_title.eq_ignore_ascii_case(desired_role))
        .filter(|p| {
            seeker.experience >= p.experience_years_required
                && seeker.mini_done >= p.mini_projects_required
                && seeker.major_done >= p.major_projects_required
        })
        .cloned()
        .collect()
}

/// Title-case a role string for display: "backend engineer" becomes
/// "Backend Engineer". Matching itself is case-insensitive; this only
/// normalizes what role pickers show.
pub fn title_case(role: &str) -> String {
    role.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
