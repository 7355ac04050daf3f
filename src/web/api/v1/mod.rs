use tide::http::StatusCode;
use tide::{Request, Response};

use crate::gallery::{self, Detail};

pub(super) fn mount(mut route: tide::Route<crate::State>) {
    route.at("/photos").get(list_photos);
    route.at("/photo/by-id/:photo_id").get(get_photo);
}

async fn list_photos(req: Request<crate::State>) -> tide::Result<Response> {
    let state = req.state();
    let mut conn = state.db.acquire().await?;

    let photos = gallery::get_gallery(&mut *conn).await?;

    let res = Response::builder(StatusCode::Ok)
        .body(tide::Body::from_json(&photos)?)
        .build();
    Ok(res)
}

async fn get_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let state = req.state();

    let photo_id = match gallery::parse_photo_id(req.param("photo_id")?) {
        Ok(photo_id) => photo_id,
        Err(err) => {
            return Ok(Response::builder(StatusCode::BadRequest)
                .body(tide::convert::json!({
                    "reason": err.to_string(),
                }))
                .build())
        },
    };

    let mut conn = state.db.acquire().await?;
    match gallery::get_detail(&mut *conn, photo_id).await? {
        Detail::Found(detail) => Ok(Response::builder(StatusCode::Ok)
            .body(tide::Body::from_json(&detail)?)
            .build()),
        Detail::NotFound(photo_id) => Ok(Response::builder(StatusCode::NotFound)
            .body(tide::convert::json!({
                "reason": format!("Photo with id {} does not exist.", photo_id),
            }))
            .build()),
    }
}
