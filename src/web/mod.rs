pub mod api;
pub mod html;
pub mod middleware;

pub(super) fn mount(app: &mut tide::Server<crate::State>) {
    app.with(middleware::RequestTracing);
    html::mount(app);
    api::mount(app.at("/api"));
}
