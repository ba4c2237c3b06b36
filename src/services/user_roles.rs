use crate::SERVICE_ACCESS_ROLE;
use crate::identity::{AuthenticatedUser, IdentityGateway, Role, check_role};
use crate::services::{ServiceError, ServiceResult};

/// Roles assigned to `user_id` by the identity provider. Callers may read
/// their own roles; reading anyone else's requires the service access role.
pub async fn get_user_roles<G>(
    gateway: &G,
    user: &AuthenticatedUser,
    user_id: &str,
) -> ServiceResult<Vec<Role>>
where
    G: IdentityGateway,
{
    if user.sub != user_id && !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    gateway.get_roles(user_id).await.map_err(|err| {
        log::error!("Failed to fetch roles for {user_id}: {err}");
        ServiceError::from(err)
    })
}
