use std::fmt;

/// Client-side route table. Three literal paths, plus a catch-all for
/// everything else. The confirmation route carries its token along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    CreatePost,
    Confirm { token: String },
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Route::Home;
        }
        if path == "/createpost" {
            return Route::CreatePost;
        }
        if let Some(token) = path.strip_prefix("/confirm/") {
            if !token.is_empty() && !token.contains('/') {
                return Route::Confirm {
                    token: token.to_string(),
                };
            }
        }
        Route::NotFound
    }
}

impl fmt::Display for Route {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(fmt, "/"),
            Route::CreatePost => write!(fmt, "/createpost"),
            Route::Confirm { token } => write!(fmt, "/confirm/{token}"),
            Route::NotFound => write!(fmt, "/404"),
        }
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn the_root_path_is_the_home_page() {
        assert_that(&Route::parse("/")).is_equal_to(Route::Home);
    }

    #[test]
    fn createpost_renders_the_form_page() {
        assert_that(&Route::parse("/createpost")).is_equal_to(Route::CreatePost);
    }

    #[test]
    fn the_confirmation_page_receives_its_token() {
        assert_that(&Route::parse("/confirm/abc123")).is_equal_to(Route::Confirm {
            token: "abc123".to_string(),
        });
    }

    #[test]
    fn unknown_paths_fall_through_to_not_found() {
        assert_that(&Route::parse("/elsewhere")).is_equal_to(Route::NotFound);
        assert_that(&Route::parse("/confirm/")).is_equal_to(Route::NotFound);
        assert_that(&Route::parse("/confirm/a/b")).is_equal_to(Route::NotFound);
    }

    #[test]
    fn a_route_renders_back_to_its_path() {
        assert_that(&Route::CreatePost.to_string()).is_equal_to("/createpost".to_string());
        assert_that(
            &Route::Confirm {
                token: "abc123".to_string(),
            }
            .to_string(),
        )
        .is_equal_to("/confirm/abc123".to_string());
    }
}
