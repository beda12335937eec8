use rocket::fairing::AdHoc;

pub mod account;
pub mod activation;
pub mod methods;
pub mod support;
pub mod withdrawal;

pub fn mount() -> AdHoc {
    AdHoc::on_ignite("Attaching Routes", |rocket| async {
        rocket.mount(
            "/",
            routes![
                account::register,
                account::mark_read,
                activation::submit,
                activation::approve,
                activation::reject,
                methods::get_not_allowed,
                methods::put_not_allowed,
                methods::patch_not_allowed,
                methods::delete_not_allowed,
                methods::preflight,
                support::submit_ticket,
                support::send_email,
                support::update_ticket,
                withdrawal::create,
                withdrawal::approve,
                withdrawal::reject
            ],
        )
    })
}
