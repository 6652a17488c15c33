//! Default body outline, in logical canvas units (400 x 300), dog in profile facing right.

/// Outline path data for the silhouette.
pub const SILHOUETTE_PATH: &str = "M72 168 \
C70 142 94 122 130 119 L248 112 \
C266 96 280 80 298 71 C312 64 330 66 339 79 \
L352 97 C361 101 363 112 354 117 L334 123 \
C327 139 314 150 302 156 L303 231 \
C303 240 291 242 287 233 L281 183 L246 186 L243 233 \
C242 241 231 242 229 233 L222 187 L158 186 L155 234 \
C154 242 143 243 141 234 L135 188 \
C118 186 104 181 94 173 L92 233 \
C91 241 80 242 78 233 L73 181 \
C60 178 48 166 42 148 C52 158 62 165 72 168 Z";

/// Stroke width of the outline, in logical units.
pub const SILHOUETTE_STROKE_WIDTH: f64 = 2.5;
