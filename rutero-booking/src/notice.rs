//! Customer notice bodies for booking lifecycle mail.
//!
//! Notices are composed as plain text with inline bold markup, then
//! converted to HTML line breaks and indentation at the end.

use rutero_accounts::User;
use rutero_catalog::BusRoute;

use crate::models::Booking;

/// Body of the confirmed-booking notice.
pub fn confirmed(user: &User, route: &BusRoute, booking: &Booking, customer_support: &str) -> String {
    let mut msg = format!("Hello {},\n", user.first_name);
    msg += &format!(
        "We are pleased to inform you that your booking from <b>{}</b> to <b>{}</b> on <b>{}</b> has been successfully confirmed.",
        route.from_route, route.to_route, booking.travel_date
    );
    msg += "&nbsp;Please find below the details of your booking:\n\n";

    msg += &booking_details(user, route, booking);

    msg += &format!(
        "If you have any questions or clarifications regarding your booking, please feel free to reach out to our customer support team at {}. Thank you and have a pleasant trip!",
        customer_support
    );

    into_html(msg)
}

/// Body of the cancellation notice when the customer asked for it.
pub fn cancelled_by_customer(
    user: &User,
    route: &BusRoute,
    booking: &Booking,
    customer_support: &str,
) -> String {
    let mut msg = format!("Hello {},\n", user.first_name);
    msg += "We have received your request to cancel your booking with the following details:\n\n";

    msg += &booking_details(user, route, booking);

    msg += "We have processed your cancellation request, and we confirm that your booking has been successfully canceled as per your instructions.\n";
    msg += &format!(
        "If you have any further questions or require assistance, please feel free to contact our customer support team at {}.\n",
        customer_support
    );

    into_html(msg)
}

/// Body of the cancellation notice when staff cancelled the trip.
pub fn cancelled_by_staff(
    user: &User,
    route: &BusRoute,
    booking: &Booking,
    customer_support: &str,
) -> String {
    let mut msg = format!("Hello {},\n", user.first_name);
    msg += "We regret to inform you that, due to unforeseen circumstances beyond our control, we must cancel your bus booking with the following details:\n\n";

    msg += &booking_details(user, route, booking);

    msg += "We apologize for any inconvenience caused by this cancellation, and we understand the impact it may have on your travel plans. Rest assured, our team is working diligently to address the situation and explore alternative solutions.\n\n";
    msg += &format!(
        "If you have any further questions or require assistance, please feel free to contact our customer support team at {}.\n",
        customer_support
    );

    into_html(msg)
}

/// The passenger, bus and schedule block shared by every notice.
fn booking_details(user: &User, route: &BusRoute, booking: &Booking) -> String {
    let mut details = String::new();

    details += &format!("<b>Passenger Name</b>: {} {}\n", user.first_name, user.last_name);
    details += &format!("<b>Bus Number</b>: {}\n", route.bus_unit_id);
    details += &format!("<b>Seat Number(s)</b>: {}\n\n", booking.seat_number);

    details += "<b>Departure Details</b>\n";
    details += &format!("\t\tLocation: {}\n", route.from_route);
    details += &format!("\t\tTime:&nbsp;&nbsp;\t{}\n\n", route.departure_time);

    details += "<b>Arrival Details</b>\n";
    details += &format!("\t\tLocation: {}\n", route.to_route);
    details += &format!("\t\tTime:&nbsp;&nbsp;\t{}\n\n", route.arrival_time);

    details
}

fn into_html(msg: String) -> String {
    msg.replace('\n', "<br/>")
        .replace('\t', "&nbsp;&nbsp;&nbsp;&nbsp;")
}

#[cfg(test)]
mod tests {
    use rutero_accounts::UserType;
    use rutero_shared::Masked;

    use super::*;

    fn passenger() -> User {
        User {
            id: "CSTMR-855048".into(),
            user_type: UserType::Customer,
            first_name: "Aria".into(),
            last_name: "Mercado".into(),
            username: "aria.m".into(),
            password: Masked("secret".to_string()),
            address: "Rizal Ave".into(),
            email: "aria@example.com".into(),
            mobile_number: "09123456789".into(),
            date_created: "1685699666".into(),
            last_login: String::new(),
        }
    }

    fn trip() -> BusRoute {
        BusRoute {
            id: "RTRTB15001900877732".into(),
            bus_id: "RLBSW-856996".into(),
            bus_unit_id: "RLBSWBUS002".into(),
            currency_code: "PHP".into(),
            rate: Some(90.0),
            active: Some(true),
            departure_time: "15:00".into(),
            arrival_time: "19:00".into(),
            from_route: "Route A".into(),
            to_route: "Route B".into(),
            date_created: "1685699666".into(),
        }
    }

    fn reservation() -> Booking {
        Booking {
            seat_number: "23,24".into(),
            travel_date: "2023-07-06 19:30".into(),
            ..Default::default()
        }
    }

    #[test]
    fn notices_are_rendered_as_html() {
        let body = confirmed(&passenger(), &trip(), &reservation(), "support@example.com");

        assert!(body.starts_with("Hello Aria,<br/>"));
        assert!(!body.contains('\n'));
        assert!(!body.contains('\t'));
        assert!(body.contains("<b>Passenger Name</b>: Aria Mercado"));
        assert!(body.contains("<b>Bus Number</b>: RLBSWBUS002"));
        assert!(body.contains("successfully confirmed"));
        assert!(body.contains("support@example.com"));
    }

    #[test]
    fn cancellation_wording_depends_on_who_asked() {
        let by_customer =
            cancelled_by_customer(&passenger(), &trip(), &reservation(), "support@example.com");
        let by_staff =
            cancelled_by_staff(&passenger(), &trip(), &reservation(), "support@example.com");

        assert!(by_customer.contains("We have received your request to cancel"));
        assert!(by_staff.contains("We regret to inform you"));
        assert!(by_staff.contains("We apologize for any inconvenience"));
    }
}
