#[cfg(test)]
pub const ENTRY_DATA: &str = "What I learned after 20+ years of software development
#published 2022-04-02 12:05:00
#tags rust career

How to be a great software engineer?

Someone asked me this question today and I didn't have an answer. After thinking for a while, I came up with a list of what I try to do myself.

I will divide this in parts, non-technical and technical
# Not a metadata line
";

#[cfg(test)]
pub const ENTRY_NO_METADATA: &str = "Title
Body line
#comment in the body
";

#[cfg(test)]
pub const ENTRY_NO_TRAILING_NEWLINE: &str = "Title
#tags one
body
last line";

#[cfg(test)]
pub const ENTRY_TWO_TAGS: &str = "Two tags
#published 2019-03-10 08:00:00
#tags twice
#published 2011-11-11 11:11:11

Which one wins?
";
