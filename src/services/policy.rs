use crate::utils::jwt::Claims;

/// What a request is trying to do, with the resource owner's id where
/// ownership matters. One variant per protected or public operation.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    ListCourses,
    CreateCourse,
    ViewCourse,
    ViewRoster,
    ViewStudentGrade { student_id: &'a str },
    ListStudents,
    AdminSignup,
    CreateStudent,
    ViewStudent { student_id: &'a str },
    UpdateStudent { student_id: &'a str },
    DeleteStudent,
    RegisterCourse { student_id: &'a str },
    RecordGrade,
    Login,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deny {
    NoToken,
    InvalidToken,
    Forbidden(&'static str),
}

/// The per-action rule, applied to claims that already passed token
/// validation.
enum Rule {
    Unauthenticated,
    /// Token header must be present; validity is not required (logout).
    TokenPresent,
    AnyValidToken,
    AdminOnly(&'static str),
    AdminOrOwner(&'static str),
    OwnerOnly(&'static str),
}

fn rule_for<'a>(action: &Action<'a>) -> (Rule, Option<&'a str>) {
    match *action {
        Action::Login | Action::AdminSignup => (Rule::Unauthenticated, None),
        Action::Logout => (Rule::TokenPresent, None),
        Action::ListCourses | Action::ViewCourse | Action::ListStudents => {
            (Rule::AnyValidToken, None)
        }
        Action::CreateCourse => (
            Rule::AdminOnly("Courses can only be created by an admin"),
            None,
        ),
        Action::ViewRoster => (
            Rule::AdminOnly("Students registered to a course can only be viewed by an admin"),
            None,
        ),
        Action::CreateStudent => (
            Rule::AdminOnly("Student accounts can only be created by an admin"),
            None,
        ),
        Action::DeleteStudent => (
            Rule::AdminOnly("Student records can only be deleted by an admin"),
            None,
        ),
        Action::RecordGrade => (Rule::AdminOnly("Grades can only be recorded by an admin"), None),
        Action::ViewStudentGrade { student_id } => (
            Rule::AdminOrOwner("Grades can only be viewed by an admin or the student"),
            Some(student_id),
        ),
        Action::ViewStudent { student_id } => (
            Rule::AdminOrOwner("Student records can only be accessed by an admin or the student"),
            Some(student_id),
        ),
        Action::UpdateStudent { student_id } => (
            Rule::AdminOrOwner("Student records can only be updated by an admin or the student"),
            Some(student_id),
        ),
        Action::RegisterCourse { student_id } => (
            Rule::OwnerOnly("Courses can only be registered by the student"),
            Some(student_id),
        ),
    }
}

/// Pure authorization decision. `token` is the raw header value if one
/// was present; `claims` is `Some` only when that token passed full
/// validation (signature, expiry, blacklist). Checks are ordered: token
/// present, then token valid, then role/ownership, each failing with its
/// own reason.
pub fn authorize(
    token: Option<&str>,
    claims: Option<&Claims>,
    action: Action,
) -> Result<(), Deny> {
    let (rule, owner_id) = rule_for(&action);

    match rule {
        Rule::Unauthenticated => return Ok(()),
        Rule::TokenPresent => {
            return if token.is_some() {
                Ok(())
            } else {
                Err(Deny::NoToken)
            }
        }
        _ => {}
    }

    if token.is_none() {
        return Err(Deny::NoToken);
    }
    let claims = claims.ok_or(Deny::InvalidToken)?;

    match rule {
        Rule::AnyValidToken => Ok(()),
        Rule::AdminOnly(reason) => {
            if claims.is_admin() {
                Ok(())
            } else {
                Err(Deny::Forbidden(reason))
            }
        }
        Rule::AdminOrOwner(reason) => {
            let owner_id = owner_id.unwrap_or_default();
            if claims.is_admin() || claims.user_id == owner_id {
                Ok(())
            } else {
                Err(Deny::Forbidden(reason))
            }
        }
        Rule::OwnerOnly(reason) => {
            let owner_id = owner_id.unwrap_or_default();
            if claims.user_id == owner_id {
                Ok(())
            } else {
                Err(Deny::Forbidden(reason))
            }
        }
        Rule::Unauthenticated | Rule::TokenPresent => unreachable!("handled above"),
    }
}
