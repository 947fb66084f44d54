use std::fmt::{Display, Formatter};

/// A user-initiated action whose failure is reported with an [`Alert`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Action {
    SignIn,
    SignUp,
    VerifyEmail,
    SignOut,
    LoadTimeline,
    Like,
    Unlike,
    Comment,
    DeleteComment,
    CreatePost,
    DeletePost,
    LoadProfile,
    Follow,
    Unfollow,
    UpdateProfile,
    LoadPets,
    RegisterPet,
    UpdatePet,
    DeletePet,
}

/// A modal message with a fixed title and body.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Alert {
    pub title: &'static str,
    pub message: &'static str,
}

impl Action {
    #[must_use]
    pub fn alert(self) -> Alert {
        let (title, message) = match self {
            Action::SignIn => ("Sign-in error", "Sign-in failed."),
            Action::SignUp => ("Sign-up error", "Registering the user failed."),
            Action::VerifyEmail => ("Verification error", "Email verification failed."),
            Action::SignOut => ("Error", "Signing out failed."),
            Action::LoadTimeline => ("Error", "Could not load posts."),
            Action::Like => ("Error", "Could not like the post."),
            Action::Unlike => ("Error", "Could not remove the like."),
            Action::Comment => ("Error", "Could not post the comment."),
            Action::DeleteComment => ("Error", "Could not delete the comment."),
            Action::CreatePost => ("Error", "Posting failed."),
            Action::DeletePost => ("Error", "Deleting failed."),
            Action::LoadProfile => ("Error", "Could not load the profile."),
            Action::Follow => ("Error", "Could not follow the user."),
            Action::Unfollow => ("Error", "Could not unfollow the user."),
            Action::UpdateProfile => ("Update error", "Updating the profile failed."),
            Action::LoadPets => ("Error", "Could not load pets."),
            Action::RegisterPet => ("Registration error", "Registering the pet failed."),
            Action::UpdatePet => ("Update error", "Updating the pet failed."),
            Action::DeletePet => ("Error", "Deleting failed."),
        };
        Alert { title, message }
    }
}

impl Display for Alert {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
