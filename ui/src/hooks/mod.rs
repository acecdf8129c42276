pub mod use_paginated_fetch;

pub use use_paginated_fetch::use_paginated_fetch;
