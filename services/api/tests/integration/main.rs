mod authenticate_test;
mod helpers;
mod router_test;
mod session_test;
