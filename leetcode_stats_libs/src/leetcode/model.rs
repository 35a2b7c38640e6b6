use crate::calendar::SubmissionCalendar;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct GraphQLErrorInfo {
    pub message: String,
}

/// Envelope of every GraphQL response.
#[derive(Serialize, Deserialize, Debug)]
pub struct GraphQLResponse<D> {
    pub data: Option<D>,
    pub errors: Option<Vec<GraphQLErrorInfo>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub real_name: Option<String>,
    pub user_avatar: Option<String>,
    pub ranking: Option<i64>,
    pub country_name: Option<String>,
    pub reputation: Option<i64>,
    pub about_me: Option<String>,
    pub school: Option<String>,
    #[serde(default)]
    pub websites: Vec<String>,
    #[serde(default)]
    pub skill_tags: Vec<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCount {
    pub difficulty: String,
    pub count: i64,
    pub submissions: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub ac_submission_num: Vec<SubmissionCount>,
    pub total_submission_num: Vec<SubmissionCount>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub profile: Profile,
    pub submit_stats_global: SubmitStats,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContestBadge {
    pub name: String,
    #[serde(default)]
    pub expired: bool,
    pub hover_text: Option<String>,
    pub icon: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContestRanking {
    pub attended_contests_count: i64,
    pub rating: f64,
    pub global_ranking: i64,
    pub total_participants: Option<i64>,
    pub top_percentage: Option<f64>,
    pub badge: Option<ContestBadge>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContestInfo {
    pub title: String,
    pub start_time: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContestHistoryEntry {
    pub attended: bool,
    pub trend_direction: Option<String>,
    pub problems_solved: i64,
    pub total_problems: i64,
    pub finish_time_in_seconds: i64,
    pub rating: f64,
    pub ranking: i64,
    pub contest: ContestInfo,
}

/// `data` of the `userProfile` query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileData {
    pub matched_user: Option<MatchedUser>,
    pub user_contest_ranking: Option<ContestRanking>,
    pub user_contest_ranking_history: Option<Vec<ContestHistoryEntry>>,
}

/// Profile bundle of a user known to exist upstream. This is the cached form of the
/// `user:<username>` family.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub matched_user: MatchedUser,
    pub user_contest_ranking: Option<ContestRanking>,
    pub user_contest_ranking_history: Option<Vec<ContestHistoryEntry>>,
}

impl UserProfileData {
    /// Returns `None` when upstream did not match the username.
    pub fn into_snapshot(self) -> Option<ProfileSnapshot> {
        let matched_user = self.matched_user?;
        Some(ProfileSnapshot {
            matched_user,
            user_contest_ranking: self.user_contest_ranking,
            user_contest_ranking_history: self.user_contest_ranking_history,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProblemCount {
    pub language_name: String,
    pub problems_solved: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageUser {
    #[serde(default)]
    pub language_problem_count: Vec<LanguageProblemCount>,
}

/// `data` of the `languageStats` query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStatsData {
    pub matched_user: Option<LanguageUser>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LanguageStat {
    pub language: String,
    #[serde(rename = "problemsSolved")]
    pub problems_solved: i64,
}

impl From<LanguageProblemCount> for LanguageStat {
    fn from(count: LanguageProblemCount) -> LanguageStat {
        LanguageStat {
            language: count.language_name,
            problems_solved: count.problems_solved,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCalendar {
    #[serde(default)]
    pub active_years: Vec<i32>,
    pub streak: Option<i64>,
    pub total_active_days: Option<i64>,
    pub submission_calendar: SubmissionCalendar,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUser {
    pub user_calendar: Option<UserCalendar>,
}

/// `data` of the `userProfileCalendar` query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarData {
    pub matched_user: Option<CalendarUser>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_user_profile_data() {
        let raw = r#"
        {
            "matchedUser": {
                "username": "alice",
                "profile": {
                    "realName": "Alice",
                    "userAvatar": "https://assets.leetcode.com/users/alice/avatar.png",
                    "ranking": 12345,
                    "countryName": null,
                    "reputation": 10,
                    "aboutMe": "",
                    "school": null,
                    "websites": ["https://example.com"],
                    "skillTags": ["rust"],
                    "company": null,
                    "jobTitle": null
                },
                "submitStatsGlobal": {
                    "acSubmissionNum": [
                        {"difficulty": "All", "count": 300, "submissions": 450},
                        {"difficulty": "Easy", "count": 120, "submissions": 150}
                    ],
                    "totalSubmissionNum": [
                        {"difficulty": "All", "count": 320, "submissions": 700}
                    ]
                }
            },
            "userContestRanking": {
                "attendedContestsCount": 12,
                "rating": 1843.27,
                "globalRanking": 20110,
                "totalParticipants": 600000,
                "topPercentage": 5.12,
                "badge": null
            },
            "userContestRankingHistory": [
                {
                    "attended": true,
                    "trendDirection": "UP",
                    "problemsSolved": 3,
                    "totalProblems": 4,
                    "finishTimeInSeconds": 4211,
                    "rating": 1602.5,
                    "ranking": 3021,
                    "contest": {"title": "Weekly Contest 400", "startTime": 1717295400}
                }
            ]
        }
        "#;

        let data: UserProfileData = serde_json::from_str(raw).unwrap();
        let snapshot = data.into_snapshot().unwrap();

        assert_eq!(snapshot.matched_user.username, "alice");
        assert_eq!(snapshot.matched_user.profile.ranking, Some(12345));
        assert_eq!(
            snapshot.matched_user.submit_stats_global.ac_submission_num[0].count,
            300
        );
        assert_eq!(snapshot.user_contest_ranking.unwrap().global_ranking, 20110);
        assert_eq!(
            snapshot.user_contest_ranking_history.unwrap()[0].contest.title,
            "Weekly Contest 400"
        );
    }

    #[test]
    fn test_unmatched_user_has_no_snapshot() {
        let raw = r#"
        {
            "data": {
                "matchedUser": null,
                "userContestRanking": null,
                "userContestRankingHistory": null
            },
            "errors": [{"message": "That user does not exist."}]
        }
        "#;

        let response: GraphQLResponse<UserProfileData> = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.errors.as_ref().unwrap()[0].message,
            "That user does not exist."
        );
        assert!(response.data.unwrap().into_snapshot().is_none());
    }

    #[test]
    fn test_deserialize_calendar_data() {
        let raw = r#"
        {
            "matchedUser": {
                "userCalendar": {
                    "activeYears": [2023, 2024],
                    "streak": 5,
                    "totalActiveDays": 120,
                    "submissionCalendar": "{\"1704067200\": 2, \"1704153600\": 5}"
                }
            }
        }
        "#;

        let data: CalendarData = serde_json::from_str(raw).unwrap();
        let calendar = data.matched_user.unwrap().user_calendar.unwrap();

        assert_eq!(calendar.active_years, vec![2023, 2024]);
        assert_eq!(calendar.submission_calendar.0.get("1704153600"), Some(&5));
    }

    #[test]
    fn test_reshape_language_stat() {
        let count = LanguageProblemCount {
            language_name: String::from("Rust"),
            problems_solved: 42,
        };
        let stat = LanguageStat::from(count);

        assert_eq!(
            serde_json::to_value(&stat).unwrap(),
            serde_json::json!({"language": "Rust", "problemsSolved": 42})
        );
    }
}
