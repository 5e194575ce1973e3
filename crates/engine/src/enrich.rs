use futures::future::join_all;
use smartdine_backend::RoutingProvider;
use smartdine_model::{Coordinates, Routable};

/// Attach a route from `origin` to every item that has coordinates.
///
/// Lookups run concurrently. An item whose lookup fails, or that has no
/// route, is left without one. Item order never changes.
pub async fn attach_routes<T: Routable>(
    router: &dyn RoutingProvider,
    origin: Coordinates,
    items: &mut [T],
) {
    let lookups = items.iter().map(|item| async move {
        let destination = item.destination()?;
        match router.route(origin, destination).await {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(
                    router = router.name(),
                    destination = %destination,
                    error = %e,
                    "Route lookup failed"
                );
                None
            }
        }
    });
    let routes = join_all(lookups).await;

    for (item, route) in items.iter_mut().zip(routes) {
        if let Some(route) = route {
            item.attach_route(route);
        }
    }
}
