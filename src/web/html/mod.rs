use tide::http::{mime, StatusCode};
use tide::{Request, Response};

use crate::db::photos::PhotoProvider;
use crate::gallery::{self, Detail};
use crate::State;

pub mod utils;

use utils::render;

pub(in super::super) fn mount(route: &mut tide::Server<State>) {
    route.at("/").get(gallery_page);
    route.at("/sitemap.xml").get(sitemap);

    route.at("/photos").get(photo_grid);
    route.at("/photos/:photo_id").get(photo_fragment);

    route.at("/photo/:photo_id").get(photo_page);
}

/// Templates used to answer a single-photo request.
struct PhotoTemplates {
    found: &'static str,
    not_found: &'static str,
    bad_request: &'static str,
}

const FRAGMENT_TEMPLATES: PhotoTemplates = PhotoTemplates {
    found: "partials/photo_detail.html",
    not_found: "partials/photo_not_found.html",
    bad_request: "partials/bad_request.html",
};

const PAGE_TEMPLATES: PhotoTemplates = PhotoTemplates {
    found: "photo.html",
    not_found: "photo_not_found.html",
    bad_request: "bad_request.html",
};

fn base_context(state: &State, title: &str, canonical_path: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("cache_buster", &state.cache_busting_string);
    context.insert("title", title);
    context.insert(
        "canonical_href",
        &format!("{}{}", state.args.base_url, canonical_path),
    );
    context
}

fn html_response(status: StatusCode, body: String) -> Response {
    Response::builder(status)
        .content_type(mime::HTML)
        .body(body)
        .build()
}

async fn gallery_page(req: Request<State>) -> tide::Result<Response> {
    let state = req.state();
    let mut conn = state.db.acquire().await?;

    let photos = gallery::get_gallery(&mut *conn).await?;

    let mut context = base_context(state, "gallery", "/");
    context.insert("photos", &photos);

    let body = render(state, "gallery.html", &context)?;
    Ok(html_response(StatusCode::Ok, body))
}

async fn photo_grid(req: Request<State>) -> tide::Result<Response> {
    let state = req.state();
    let mut conn = state.db.acquire().await?;

    let photos = gallery::get_gallery(&mut *conn).await?;

    let mut context = tera::Context::new();
    context.insert("photos", &photos);

    let body = render(state, "partials/photo_grid.html", &context)?;
    Ok(html_response(StatusCode::Ok, body))
}

async fn sitemap(req: Request<State>) -> tide::Result<Response> {
    let state = req.state();
    let mut conn = state.db.acquire().await?;

    let mut buf = Vec::new();
    let sitemap_writer = sitemap::writer::SiteMapWriter::new(&mut buf);
    let mut urlwriter = sitemap_writer.start_urlset()?;

    urlwriter.url(format!("{}/", state.args.base_url))?;

    for id in conn.list_photo_ids().await? {
        urlwriter.url(format!("{}/photo/{}", state.args.base_url, id))?;
    }

    urlwriter.end()?;

    let res = Response::builder(StatusCode::Ok)
        .body(buf)
        .content_type(mime::XML)
        .build();
    Ok(res)
}

async fn photo_internal(
    req: Request<State>,
    templates: &PhotoTemplates,
) -> tide::Result<Response> {
    let state = req.state();
    let raw_id = req.param("photo_id")?;

    let photo_id = match gallery::parse_photo_id(raw_id) {
        Ok(photo_id) => photo_id,
        Err(err) => {
            tracing::info!("rejecting request: {}", err);
            let mut context = base_context(state, "Bad request", "/");
            context.insert("reason", &err.to_string());
            let body = render(state, templates.bad_request, &context)?;
            return Ok(html_response(StatusCode::BadRequest, body));
        },
    };

    let mut conn = state.db.acquire().await?;
    let detail = gallery::get_detail(&mut *conn, photo_id).await?;

    let mut context = base_context(state, "", &format!("/photo/{}", photo_id));
    match detail {
        Detail::Found(detail) => {
            context.insert("title", &detail.photo.title);
            context.insert("photo", &detail.photo);
            context.insert("previous_id", &detail.previous_id);
            context.insert("next_id", &detail.next_id);

            let body = render(state, templates.found, &context)?;
            Ok(html_response(StatusCode::Ok, body))
        },
        Detail::NotFound(photo_id) => {
            context.insert("title", "Photo not found");
            context.insert("photo_id", &photo_id);

            let body = render(state, templates.not_found, &context)?;
            Ok(html_response(StatusCode::NotFound, body))
        },
    }
}

/// Detail fragment swapped into the gallery page by htmx.
async fn photo_fragment(req: Request<State>) -> tide::Result<Response> {
    photo_internal(req, &FRAGMENT_TEMPLATES).await
}

/// Standalone page for a single photo.
async fn photo_page(req: Request<State>) -> tide::Result<Response> {
    photo_internal(req, &PAGE_TEMPLATES).await
}
