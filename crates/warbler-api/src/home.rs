use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use warbler_types::api::HomeResponse;
use warbler_types::flash::{FLASH_COOKIE, Flash};

use crate::ApiError;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};

/// GET / — consumes any pending flash, plus the timeline when logged in.
pub async fn home(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|c| Flash::from_code(c.value()))
        .map(|f| f.message().to_string());
    let jar = if jar.get(FLASH_COOKIE).is_some() {
        let mut spent = Cookie::from(FLASH_COOKIE);
        spent.set_path("/");
        jar.remove(spent)
    } else {
        jar
    };

    let timeline = match &ctx.current_user {
        Some(user) => {
            let user_id = user.id;
            let limit = state.timeline_limit;
            run_blocking(&state, move |db| {
                Ok(db
                    .timeline(user_id, limit)?
                    .into_iter()
                    .map(|row| row.into_message())
                    .collect::<Vec<_>>())
            })
            .await?
        }
        None => Vec::new(),
    };

    Ok((
        jar,
        Json(HomeResponse {
            flash,
            user: ctx.current_user,
            timeline,
        }),
    ))
}
