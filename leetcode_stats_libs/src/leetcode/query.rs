//! GraphQL documents sent to the LeetCode endpoint.
use serde::Serialize;

pub const USER_PROFILE_QUERY: &str = r#"
query userProfile($username: String!) {
  matchedUser(username: $username) {
    username
    profile {
      realName
      userAvatar
      ranking
      countryName
      reputation
      aboutMe
      school
      websites
      skillTags
      company
      jobTitle
    }
    submitStatsGlobal {
      acSubmissionNum {
        difficulty
        count
        submissions
      }
      totalSubmissionNum {
        difficulty
        count
        submissions
      }
    }
  }
  userContestRanking(username: $username) {
    attendedContestsCount
    rating
    globalRanking
    totalParticipants
    topPercentage
    badge {
      name
      expired
      hoverText
      icon
    }
  }
  userContestRankingHistory(username: $username) {
    attended
    trendDirection
    problemsSolved
    totalProblems
    finishTimeInSeconds
    rating
    ranking
    contest {
      title
      startTime
    }
  }
}
"#;

pub const LANGUAGE_STATS_QUERY: &str = r#"
query languageStats($username: String!) {
  matchedUser(username: $username) {
    languageProblemCount {
      languageName
      problemsSolved
    }
  }
}
"#;

pub const USER_CALENDAR_QUERY: &str = r#"
query userProfileCalendar($username: String!, $year: Int) {
  matchedUser(username: $username) {
    userCalendar(year: $year) {
      activeYears
      streak
      totalActiveDays
      submissionCalendar
    }
  }
}
"#;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserVariables<'a> {
    pub username: &'a str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CalendarVariables<'a> {
    pub username: &'a str,
    pub year: i32,
}

/// Request body of a GraphQL call.
#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}
